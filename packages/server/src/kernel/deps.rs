//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! actions. External services (wallet, mail) and the moderation ruleset use
//! trait abstractions so tests can swap them out.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Economics;
use crate::kernel::presence::PresenceRegistry;
use crate::kernel::room_hub::RoomHub;
use crate::kernel::traits::{BaseMailer, BaseModerationService, BaseWalletService};

/// Dependencies accessible to domain actions
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Atomic balance deltas against the externally-owned wallet.
    pub wallet: Arc<dyn BaseWalletService>,
    /// Fire-and-forget outbound email sink.
    pub mailer: Arc<dyn BaseMailer>,
    /// Injected moderation ruleset; evaluated once per outbound message.
    pub moderation: Arc<dyn BaseModerationService>,
    /// Per-conversation realtime broadcast.
    pub room_hub: RoomHub,
    /// Who is currently viewing which conversation.
    pub presence: PresenceRegistry,
    pub economics: Economics,
    /// Base URL for generated consultation meeting links.
    pub meeting_base_url: String,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        wallet: Arc<dyn BaseWalletService>,
        mailer: Arc<dyn BaseMailer>,
        moderation: Arc<dyn BaseModerationService>,
        room_hub: RoomHub,
        presence: PresenceRegistry,
        economics: Economics,
        meeting_base_url: String,
    ) -> Self {
        Self {
            db_pool,
            wallet,
            mailer,
            moderation,
            room_hub,
            presence,
            economics,
            meeting_base_url,
        }
    }
}
