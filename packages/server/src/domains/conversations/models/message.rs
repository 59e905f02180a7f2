use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ConversationId, MessageId, ProfileId};

/// Message - one entry in a conversation's append-only ledger.
///
/// Content is immutable once persisted; corrections happen by posting a new
/// message. Ordering is by creation time with `seq` as the insertion
/// tie-breaker, and that ordering is the only consistency guarantee clients
/// may rely on.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: ProfileId,
    pub receiver_id: ProfileId,
    /// Post-moderation content. The raw submission is never stored.
    pub content: String,
    pub kind: String, // 'text', 'system', 'meeting'
    pub is_admin: bool,
    pub is_blurred: bool,
    pub is_read: bool,
    pub seq: i64,
    pub created_at: DateTime<Utc>,
}

/// Message kind enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    System,
    Meeting,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::System => write!(f, "system"),
            MessageKind::Meeting => write!(f, "meeting"),
        }
    }
}

impl std::str::FromStr for MessageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(MessageKind::Text),
            "system" => Ok(MessageKind::System),
            "meeting" => Ok(MessageKind::Meeting),
            _ => Err(anyhow::anyhow!("Invalid message kind: {}", s)),
        }
    }
}

impl Message {
    /// Find message by ID
    pub async fn find_by_id(id: MessageId, pool: &PgPool) -> Result<Option<Self>> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(message)
    }

    /// Append a new message to a conversation.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        conversation_id: ConversationId,
        sender_id: ProfileId,
        receiver_id: ProfileId,
        content: String,
        kind: MessageKind,
        is_admin: bool,
        is_blurred: bool,
        executor: impl sqlx::PgExecutor<'_>,
    ) -> Result<Self> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (
                id, conversation_id, sender_id, receiver_id,
                content, kind, is_admin, is_blurred
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(MessageId::new())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(kind.to_string())
        .bind(is_admin)
        .bind(is_blurred)
        .fetch_one(executor)
        .await?;
        Ok(message)
    }

    /// Ordered history for a conversation, oldest first.
    ///
    /// `limit` returns the most recent N in chronological order (pagination
    /// is a non-breaking extension; `None` returns everything).
    pub async fn find_by_conversation(
        conversation_id: ConversationId,
        limit: Option<i64>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let messages = match limit {
            Some(limit) => {
                sqlx::query_as::<_, Message>(
                    r#"
                    SELECT * FROM (
                        SELECT * FROM messages
                        WHERE conversation_id = $1
                        ORDER BY created_at DESC, seq DESC
                        LIMIT $2
                    ) recent
                    ORDER BY created_at, seq
                    "#,
                )
                .bind(conversation_id)
                .bind(limit)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Message>(
                    r#"
                    SELECT * FROM messages
                    WHERE conversation_id = $1
                    ORDER BY created_at, seq
                    "#,
                )
                .bind(conversation_id)
                .fetch_all(pool)
                .await?
            }
        };
        Ok(messages)
    }

    /// Mark everything addressed to `reader_id` in the conversation as read.
    pub async fn mark_read(
        conversation_id: ConversationId,
        reader_id: ProfileId,
        pool: &PgPool,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE conversation_id = $1 AND receiver_id = $2 AND NOT is_read
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Unread messages addressed to a profile in one conversation.
    pub async fn unread_count(
        conversation_id: ConversationId,
        profile_id: ProfileId,
        pool: &PgPool,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE conversation_id = $1 AND receiver_id = $2 AND NOT is_read
            "#,
        )
        .bind(conversation_id)
        .bind(profile_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_roundtrip() {
        for kind in [MessageKind::Text, MessageKind::System, MessageKind::Meeting] {
            assert_eq!(MessageKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(MessageKind::from_str("image").is_err());
    }
}
