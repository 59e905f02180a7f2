//! Consultations domain: pre-paid single-use video call credits.

pub mod actions;
pub mod models;
