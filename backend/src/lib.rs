//! SePay Subscriptions - Bank-transfer subscription checkout
//!
//! This crate opens pending subscription orders, reconciles SePay transfer
//! webhooks against them, and upgrades paying accounts to the premium tier.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
