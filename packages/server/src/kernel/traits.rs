// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like "accept an offer") lives in domain actions that use
// these traits.
//
// Naming convention: Base* for trait names (e.g., BaseWalletService)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{CoreResult, ProfileId};
use crate::domains::moderation::Screened;

// =============================================================================
// Wallet Trait (Infrastructure - external balance primitive)
// =============================================================================

/// Atomic delta operations against the externally-owned wallet balance.
///
/// The core never reads-modifies-writes a balance across round trips; every
/// mutation is a single guarded delta, so concurrent spends cannot drive a
/// balance below zero.
#[async_trait]
pub trait BaseWalletService: Send + Sync {
    /// Debit `amount` if and only if the current balance covers it.
    ///
    /// # Errors
    ///
    /// `CoreError::InsufficientFunds` when the balance guard fails,
    /// `CoreError::NotFound` when the profile does not exist.
    async fn debit(&self, profile_id: ProfileId, amount: i64) -> CoreResult<()>;

    /// Credit `amount` unconditionally (settlements, compensations).
    async fn credit(&self, profile_id: ProfileId, amount: i64) -> CoreResult<()>;

    /// Current balance snapshot (informational only; never use for guards).
    async fn balance(&self, profile_id: ProfileId) -> CoreResult<i64>;
}

// =============================================================================
// Mailer Trait (Infrastructure - outbound notification sink)
// =============================================================================

/// Outbound email sink. Callers treat delivery as fire-and-forget: failures
/// are logged and swallowed, never surfaced to the primary operation.
#[async_trait]
pub trait BaseMailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

// =============================================================================
// Moderation Trait (Infrastructure - injectable ruleset)
// =============================================================================

/// Injectable message-screening strategy.
///
/// Screening is pure and synchronous; implementations must be evaluated
/// exactly once per outbound participant message, before persistence.
pub trait BaseModerationService: Send + Sync {
    fn screen(&self, text: &str) -> Screened;
}
