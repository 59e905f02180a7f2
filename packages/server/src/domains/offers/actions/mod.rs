pub mod accept_offer;
pub mod create_offer;
pub mod reject_offer;

pub use accept_offer::accept_offer;
pub use create_offer::create_offer;
pub use reject_offer::reject_offer;
