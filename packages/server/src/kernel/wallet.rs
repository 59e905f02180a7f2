// Wallet Service Implementation (Postgres-backed atomic deltas)

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::{CoreError, CoreResult, ProfileId};
use crate::kernel::traits::BaseWalletService;

/// Applies guarded balance deltas against the `profiles` table.
///
/// Both mutations are single conditional statements; the database row lock is
/// the only synchronization, so two concurrent debits can never jointly
/// overdraw a balance.
pub struct PostgresWallet {
    pool: PgPool,
}

impl PostgresWallet {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseWalletService for PostgresWallet {
    async fn debit(&self, profile_id: ProfileId, amount: i64) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE profiles SET balance = balance - $2 WHERE id = $1 AND balance >= $2",
        )
        .bind(profile_id)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish "no such profile" from "guard failed".
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM profiles WHERE id = $1")
                    .bind(profile_id)
                    .fetch_optional(&self.pool)
                    .await?;

            return match exists {
                Some(_) => Err(CoreError::InsufficientFunds),
                None => Err(CoreError::NotFound("profile")),
            };
        }

        tracing::debug!(%profile_id, amount, "wallet debited");
        Ok(())
    }

    async fn credit(&self, profile_id: ProfileId, amount: i64) -> CoreResult<()> {
        let result = sqlx::query("UPDATE profiles SET balance = balance + $2 WHERE id = $1")
            .bind(profile_id)
            .bind(amount)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("profile"));
        }

        tracing::debug!(%profile_id, amount, "wallet credited");
        Ok(())
    }

    async fn balance(&self, profile_id: ProfileId) -> CoreResult<i64> {
        let balance: Option<i64> = sqlx::query_scalar("SELECT balance FROM profiles WHERE id = $1")
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;

        balance.ok_or(CoreError::NotFound("profile"))
    }
}
