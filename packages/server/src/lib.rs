// Marketplace Conversations - API Core
//
// This crate provides the messaging, moderation and escrow backend for the
// services marketplace: two-party conversations, automated content screening
// with conversation freezing, custom offers with escrowed acceptance, and
// pre-paid consultation booking.
//
// Architecture follows domain-driven design; realtime delivery is SSE-based.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
