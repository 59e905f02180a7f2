pub mod admin;
pub mod consultations;
pub mod conversations;
pub mod health;
pub mod offers;
pub mod stream;

pub use health::health_handler;
pub use stream::stream_handler;
