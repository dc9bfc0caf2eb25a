//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `subscription` - Bank-transfer subscription lifecycle and reconciliation

pub mod foundation;
pub mod subscription;
