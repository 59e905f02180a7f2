use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{ConversationId, OfferId, ProfileId};

/// Offer - a proposed price/scope/timeline embedded in a conversation.
///
/// Status transitions are monotonic: `pending -> accepted | rejected`,
/// terminal thereafter. Only the receiver may act on an offer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Offer {
    pub id: OfferId,
    pub conversation_id: ConversationId,
    pub sender_id: ProfileId,
    pub receiver_id: ProfileId,
    pub price: i64,
    pub delivery_days: i32,
    pub description: String,
    pub milestones: Json<Vec<Milestone>>,
    pub status: String, // 'pending', 'accepted', 'rejected'
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A named slice of the offer's deliverables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Milestone {
    pub name: String,
    pub price: i64,
    pub due_date: Option<NaiveDate>,
}

/// Offer status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferStatus::Pending => write!(f, "pending"),
            OfferStatus::Accepted => write!(f, "accepted"),
            OfferStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for OfferStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(OfferStatus::Pending),
            "accepted" => Ok(OfferStatus::Accepted),
            "rejected" => Ok(OfferStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid offer status: {}", s)),
        }
    }
}

impl Offer {
    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }

    /// Find offer by ID
    pub async fn find_by_id(id: OfferId, pool: &PgPool) -> Result<Option<Self>> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(offer)
    }

    /// Offers in a conversation, newest first.
    pub async fn find_by_conversation(
        conversation_id: ConversationId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let offers = sqlx::query_as::<_, Offer>(
            "SELECT * FROM offers WHERE conversation_id = $1 ORDER BY created_at DESC",
        )
        .bind(conversation_id)
        .fetch_all(pool)
        .await?;
        Ok(offers)
    }

    /// Create a new pending offer.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        conversation_id: ConversationId,
        sender_id: ProfileId,
        receiver_id: ProfileId,
        price: i64,
        delivery_days: i32,
        description: String,
        milestones: Vec<Milestone>,
        pool: &PgPool,
    ) -> Result<Self> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (
                id, conversation_id, sender_id, receiver_id,
                price, delivery_days, description, milestones
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(OfferId::new())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(price)
        .bind(delivery_days)
        .bind(description)
        .bind(Json(milestones))
        .fetch_one(pool)
        .await?;
        Ok(offer)
    }

    /// Flip a pending offer to `accepted`, but only for its receiver.
    ///
    /// The `status = 'pending'` predicate is the serialization point for
    /// concurrent acceptance: exactly one caller gets the row back, every
    /// other caller gets `None`.
    pub async fn try_accept(
        id: OfferId,
        receiver_id: ProfileId,
        executor: impl sqlx::PgExecutor<'_>,
    ) -> Result<Option<Self>> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = 'accepted', accepted_at = NOW()
            WHERE id = $1 AND receiver_id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(receiver_id)
        .fetch_optional(executor)
        .await?;
        Ok(offer)
    }

    /// Flip a pending offer to `rejected`, but only for its receiver.
    /// Same conditional-update contract as [`Offer::try_accept`].
    pub async fn try_reject(
        id: OfferId,
        receiver_id: ProfileId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = 'rejected'
            WHERE id = $1 AND receiver_id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(receiver_id)
        .fetch_optional(pool)
        .await?;
        Ok(offer)
    }
}
