//! Shared building blocks: typed IDs and the core error taxonomy.

pub mod entity_ids;
pub mod error;
pub mod id;

pub use entity_ids::*;
pub use error::{CoreError, CoreResult};
