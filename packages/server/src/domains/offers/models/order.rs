use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{OfferId, OrderId, ProfileId};

/// Order - escrowed work commitment produced by accepting an offer.
///
/// `amount` is captured at acceptance time and never changes afterwards,
/// even if the originating offer's terms are edited upstream.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: ProfileId,
    pub seller_id: ProfileId,
    pub amount: i64,
    pub platform_fee: i64,
    pub delivery_date: DateTime<Utc>,
    pub status: String, // 'active', 'completed', 'disputed', 'refunded', 'cancelled'
    pub offer_id: Option<OfferId>,
    pub created_at: DateTime<Utc>,
}

/// Order status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    Completed,
    Disputed,
    Refunded,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Active => write!(f, "active"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Disputed => write!(f, "disputed"),
            OrderStatus::Refunded => write!(f, "refunded"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(OrderStatus::Active),
            "completed" => Ok(OrderStatus::Completed),
            "disputed" => Ok(OrderStatus::Disputed),
            "refunded" => Ok(OrderStatus::Refunded),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid order status: {}", s)),
        }
    }
}

impl Order {
    /// Create a new active order.
    pub async fn create(
        buyer_id: ProfileId,
        seller_id: ProfileId,
        amount: i64,
        platform_fee: i64,
        delivery_date: DateTime<Utc>,
        offer_id: Option<OfferId>,
        executor: impl sqlx::PgExecutor<'_>,
    ) -> Result<Self> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, buyer_id, seller_id, amount, platform_fee, delivery_date, offer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(OrderId::new())
        .bind(buyer_id)
        .bind(seller_id)
        .bind(amount)
        .bind(platform_fee)
        .bind(delivery_date)
        .bind(offer_id)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    /// Find order by ID
    pub async fn find_by_id(id: OrderId, pool: &PgPool) -> Result<Option<Self>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(order)
    }

    /// The order created from a given offer, if any.
    pub async fn find_by_offer(offer_id: OfferId, pool: &PgPool) -> Result<Option<Self>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE offer_id = $1")
            .bind(offer_id)
            .fetch_optional(pool)
            .await?;
        Ok(order)
    }
}
