//! Offers domain: custom offers, acceptance into escrowed orders, rejection.

pub mod actions;
pub mod models;
