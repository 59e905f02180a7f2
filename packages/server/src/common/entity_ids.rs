//! Typed ID definitions for all domain entities.
//!
//! Each domain entity gets its own incompatible ID type, so the compiler
//! prevents passing, say, an `OfferId` where a `ConversationId` is expected.

// Re-export the core Id type and version markers
pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Profile entities (marketplace users).
pub struct Profile;

/// Marker type for Conversation entities (two-party threads).
pub struct Conversation;

/// Marker type for Message entities.
pub struct Message;

/// Marker type for Offer entities (custom commercial offers).
pub struct Offer;

/// Marker type for Order entities (escrowed work orders).
pub struct Order;

/// Marker type for ConsultationPayment entities (pre-paid meeting credits).
pub struct ConsultationPayment;

/// Marker type for realtime sessions (one per connected SSE stream).
pub struct Session;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Profile entities.
pub type ProfileId = Id<Profile>;

/// Typed ID for Conversation entities.
pub type ConversationId = Id<Conversation>;

/// Typed ID for Message entities.
pub type MessageId = Id<Message>;

/// Typed ID for Offer entities.
pub type OfferId = Id<Offer>;

/// Typed ID for Order entities.
pub type OrderId = Id<Order>;

/// Typed ID for ConsultationPayment entities.
pub type ConsultationPaymentId = Id<ConsultationPayment>;

/// Typed ID for realtime sessions. Random (V4): sessions are ephemeral and
/// never stored, so time-ordering buys nothing.
pub type SessionId = Id<Session, V4>;
