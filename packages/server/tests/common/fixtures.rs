//! Test fixtures for creating test data.
//!
//! Profiles are owned by the external identity system in production; tests
//! seed them directly.

use anyhow::Result;
use api_core::common::ProfileId;
use sqlx::PgPool;

/// Insert a profile row with the given role and wallet balance.
pub async fn create_test_profile(
    pool: &PgPool,
    name: &str,
    role: &str,
    balance: i64,
) -> Result<ProfileId> {
    let id = ProfileId::new();
    sqlx::query(
        "INSERT INTO profiles (id, display_name, email, role, balance) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(name)
    .bind(format!("{}@test.local", id.as_uuid().simple()))
    .bind(role)
    .bind(balance)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Client profile with the given balance.
pub async fn create_test_client(pool: &PgPool, balance: i64) -> Result<ProfileId> {
    create_test_profile(pool, "Test Client", "client", balance).await
}

/// Freelancer profile with an empty wallet.
pub async fn create_test_freelancer(pool: &PgPool) -> Result<ProfileId> {
    create_test_profile(pool, "Test Freelancer", "freelancer", 0).await
}

/// Current wallet balance for a profile.
pub async fn balance_of(pool: &PgPool, profile_id: ProfileId) -> Result<i64> {
    let balance = sqlx::query_scalar("SELECT balance FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_one(pool)
        .await?;
    Ok(balance)
}
