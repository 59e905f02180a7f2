pub mod auth;
pub mod consultations;
pub mod conversations;
pub mod moderation;
pub mod offers;
pub mod profiles;
