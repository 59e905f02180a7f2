use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub meeting_base_url: String,
    pub moderation_enabled: bool,
    pub extra_banned_words: Vec<String>,
    pub economics: Economics,
}

/// Platform money constants: escrow fee rate and price floors.
///
/// Amounts are whole currency units (no minor units).
#[derive(Debug, Clone, Copy)]
pub struct Economics {
    /// Platform fee as a percentage of the order amount.
    pub fee_rate_percent: i64,
    /// Minimum price for a custom offer.
    pub min_offer_price: i64,
    /// Maximum price for a custom offer. Keeps fee math and milestone sums
    /// inside i64 range.
    pub max_offer_price: i64,
    /// Fixed price of a consultation credit.
    pub consultation_fee: i64,
}

impl Default for Economics {
    fn default() -> Self {
        Self {
            fee_rate_percent: 20,
            min_offer_price: 500,
            max_offer_price: 1_000_000_000,
            consultation_fee: 100,
        }
    }
}

impl Economics {
    /// Fee captured by the platform for an order of the given amount.
    ///
    /// Widened to i128 so the multiply cannot overflow even for amounts far
    /// beyond `max_offer_price`; every amount that passes offer validation
    /// fits back into i64.
    pub fn platform_fee(&self, amount: i64) -> i64 {
        (i128::from(amount) * i128::from(self.fee_rate_percent) / 100) as i64
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Economics::default();
        let economics = Economics {
            fee_rate_percent: env_i64("PLATFORM_FEE_PERCENT", defaults.fee_rate_percent)?,
            min_offer_price: env_i64("MIN_OFFER_PRICE", defaults.min_offer_price)?,
            max_offer_price: env_i64("MAX_OFFER_PRICE", defaults.max_offer_price)?,
            consultation_fee: env_i64("CONSULTATION_FEE", defaults.consultation_fee)?,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "marketplace-api".to_string()),
            mail_api_url: env::var("MAIL_API_URL").ok(),
            mail_api_key: env::var("MAIL_API_KEY").ok(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@marketplace.local".to_string()),
            meeting_base_url: env::var("MEETING_BASE_URL")
                .unwrap_or_else(|_| "https://meet.marketplace.local".to_string()),
            moderation_enabled: env::var("MODERATION_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            extra_banned_words: env::var("BANNED_WORDS")
                .map(|v| {
                    v.split(',')
                        .map(|w| w.trim().to_string())
                        .filter(|w| !w.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            economics,
        })
    }
}

fn env_i64(key: &str, default: i64) -> Result<i64> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}
