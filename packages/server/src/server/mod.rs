//! HTTP surface: router assembly, auth middleware, route handlers.

pub mod app;
pub mod middleware;
pub mod routes;

pub use app::{build_app, AxumAppState};
