use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ConsultationPaymentId, ConversationId, ProfileId};

/// ConsultationPayment - a single-use pre-paid credit for one video call.
///
/// Lifecycle is two states: unused, then used. The partial unique index on
/// (payer_id, conversation_id) WHERE NOT used means a payer can hold at most
/// one live credit per conversation at any moment; paying again only becomes
/// possible after the credit is consumed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConsultationPayment {
    pub id: ConsultationPaymentId,
    pub payer_id: ProfileId,
    pub conversation_id: ConversationId,
    pub amount: i64,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl ConsultationPayment {
    /// Record a new unused credit.
    ///
    /// Violating the unused-pair index surfaces as a database error here; the
    /// caller maps it to a duplicate-payment rejection.
    pub async fn create(
        payer_id: ProfileId,
        conversation_id: ConversationId,
        amount: i64,
        executor: impl sqlx::PgExecutor<'_>,
    ) -> Result<Self, sqlx::Error> {
        let payment = sqlx::query_as::<_, ConsultationPayment>(
            r#"
            INSERT INTO consultation_payments (id, payer_id, conversation_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(ConsultationPaymentId::new())
        .bind(payer_id)
        .bind(conversation_id)
        .bind(amount)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    /// The payer's unused credit in a conversation, if one exists.
    pub async fn find_unused(
        payer_id: ProfileId,
        conversation_id: ConversationId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let payment = sqlx::query_as::<_, ConsultationPayment>(
            r#"
            SELECT * FROM consultation_payments
            WHERE payer_id = $1 AND conversation_id = $2 AND NOT used
            "#,
        )
        .bind(payer_id)
        .bind(conversation_id)
        .fetch_optional(pool)
        .await?;
        Ok(payment)
    }

    /// The oldest unused credit in a conversation regardless of payer.
    pub async fn find_unused_for_conversation(
        conversation_id: ConversationId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let payment = sqlx::query_as::<_, ConsultationPayment>(
            r#"
            SELECT * FROM consultation_payments
            WHERE conversation_id = $1 AND NOT used
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(pool)
        .await?;
        Ok(payment)
    }

    /// Atomically consume one unused credit in the conversation.
    ///
    /// SKIP LOCKED keeps concurrent schedulers from blocking on each other:
    /// each call either claims a distinct credit or sees `None`. A credit is
    /// spent exactly once.
    pub async fn try_consume(
        conversation_id: ConversationId,
        executor: impl sqlx::PgExecutor<'_>,
    ) -> Result<Option<Self>> {
        let payment = sqlx::query_as::<_, ConsultationPayment>(
            r#"
            UPDATE consultation_payments
            SET used = TRUE
            WHERE id = (
                SELECT id FROM consultation_payments
                WHERE conversation_id = $1 AND NOT used
                ORDER BY created_at
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(executor)
        .await?;
        Ok(payment)
    }
}
