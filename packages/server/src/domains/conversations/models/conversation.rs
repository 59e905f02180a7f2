use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ConversationId, MessageId, ProfileId};

/// Conversation - durable two-party messaging thread.
///
/// Participant order is display-stable (first = whoever initiated);
/// `pair_low`/`pair_high` is the canonical unordered key that guarantees at
/// most one conversation per pair.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: ConversationId,
    pub first_participant_id: ProfileId,
    pub second_participant_id: ProfileId,
    #[serde(skip)]
    pub pair_low: ProfileId,
    #[serde(skip)]
    pub pair_high: ProfileId,
    pub is_frozen: bool,
    pub last_message: Option<String>,
    pub last_message_id: Option<MessageId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Whether the given profile is one of the two participants.
    pub fn contains(&self, profile_id: ProfileId) -> bool {
        self.first_participant_id == profile_id || self.second_participant_id == profile_id
    }

    /// The participant other than `profile_id`, if `profile_id` is a participant.
    pub fn other_participant(&self, profile_id: ProfileId) -> Option<ProfileId> {
        if self.first_participant_id == profile_id {
            Some(self.second_participant_id)
        } else if self.second_participant_id == profile_id {
            Some(self.first_participant_id)
        } else {
            None
        }
    }

    /// Find conversation by ID
    pub async fn find_by_id(id: ConversationId, pool: &PgPool) -> Result<Option<Self>> {
        let conversation =
            sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(conversation)
    }

    /// Look up or lazily create the conversation for a participant pair.
    ///
    /// Race-safe: the unique index on (pair_low, pair_high) is the
    /// tie-breaker. Concurrent first-contact attempts both try the insert;
    /// the loser's `ON CONFLICT DO NOTHING` returns no row and the follow-up
    /// select converges on the winner's record.
    pub async fn find_or_create_for_pair(
        initiator_id: ProfileId,
        other_id: ProfileId,
        pool: &PgPool,
    ) -> Result<Self> {
        let (pair_low, pair_high) = if initiator_id.as_uuid() <= other_id.as_uuid() {
            (initiator_id, other_id)
        } else {
            (other_id, initiator_id)
        };

        let inserted = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (
                id, first_participant_id, second_participant_id, pair_low, pair_high
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (pair_low, pair_high) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(ConversationId::new())
        .bind(initiator_id)
        .bind(other_id)
        .bind(pair_low)
        .bind(pair_high)
        .fetch_optional(pool)
        .await?;

        if let Some(conversation) = inserted {
            return Ok(conversation);
        }

        let existing = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE pair_low = $1 AND pair_high = $2",
        )
        .bind(pair_low)
        .bind(pair_high)
        .fetch_one(pool)
        .await?;
        Ok(existing)
    }

    /// Conversations involving a profile, most recently active first.
    pub async fn list_for_profile(profile_id: ProfileId, pool: &PgPool) -> Result<Vec<Self>> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE first_participant_id = $1 OR second_participant_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await?;
        Ok(conversations)
    }

    /// All conversations, most recently active first (admin oversight).
    pub async fn list_recent(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations ORDER BY updated_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(conversations)
    }

    /// Set the freeze flag.
    pub async fn set_frozen(
        id: ConversationId,
        frozen: bool,
        pool: &PgPool,
    ) -> Result<Self> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversations
            SET is_frozen = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(frozen)
        .fetch_one(pool)
        .await?;
        Ok(conversation)
    }

    /// Refresh the denormalized last-message fields.
    pub async fn touch_last_message(
        id: ConversationId,
        preview: &str,
        message_id: MessageId,
        executor: impl sqlx::PgExecutor<'_>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message = $2, last_message_id = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(preview)
        .bind(message_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}
