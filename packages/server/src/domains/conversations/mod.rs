//! Conversations domain - two-party threads, the append-only message ledger,
//! and the freeze state machine.

pub mod actions;
pub mod models;

pub use models::*;
