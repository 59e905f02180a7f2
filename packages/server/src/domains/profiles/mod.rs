//! Profiles domain - read-side view of the externally-owned identity record.
//!
//! Registration, onboarding and profile editing happen outside this core; we
//! only read the fields the messaging/escrow paths depend on (role, email,
//! suspension flag) and apply wallet deltas through `kernel::wallet`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ProfileId;

/// Marketplace user as seen by this core.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    pub email: String,
    pub role: String, // 'client', 'freelancer', 'admin'
    pub balance: i64,
    pub suspended: bool,
    pub created_at: DateTime<Utc>,
}

/// Profile role enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
    Client,
    Freelancer,
    Admin,
}

impl std::fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileRole::Client => write!(f, "client"),
            ProfileRole::Freelancer => write!(f, "freelancer"),
            ProfileRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for ProfileRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(ProfileRole::Client),
            "freelancer" => Ok(ProfileRole::Freelancer),
            "admin" => Ok(ProfileRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid profile role: {}", s)),
        }
    }
}

impl Profile {
    /// Find profile by ID
    pub async fn find_by_id(id: ProfileId, pool: &PgPool) -> Result<Option<Self>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(profile)
    }

    pub fn is_client(&self) -> bool {
        self.role == "client"
    }
}
