pub mod offer;
pub mod order;

pub use offer::{Milestone, Offer, OfferStatus};
pub use order::{Order, OrderStatus};
