pub mod admin;
pub mod post_message;

pub use admin::{admin_post_message, set_conversation_frozen};
pub use post_message::post_message;
