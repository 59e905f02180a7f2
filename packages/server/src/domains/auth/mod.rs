//! Token verification for the externally-issued session JWTs.

pub mod jwt;

pub use jwt::{Claims, JwtService};
