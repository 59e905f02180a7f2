//! Infrastructure services: dependency container, trait seams and their
//! concrete implementations, realtime hub, presence tracking.

pub mod deps;
pub mod mailer;
pub mod moderation;
pub mod presence;
pub mod room_hub;
pub mod traits;
pub mod wallet;

pub use deps::ServerDeps;
pub use mailer::{create_mailer, send_detached};
pub use moderation::create_moderation_service;
pub use presence::PresenceRegistry;
pub use room_hub::{RoomEnvelope, RoomEvent, RoomHub};
pub use traits::{BaseMailer, BaseModerationService, BaseWalletService};
pub use wallet::PostgresWallet;
