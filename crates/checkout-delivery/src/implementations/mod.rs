//! Delivery channel implementations.

pub mod simulated;
pub mod webhook;
