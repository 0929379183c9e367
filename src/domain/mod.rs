//! Domain layer containing the outbox message model and its rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (event ids, timestamps, validation errors)
//! - `outbox` - Messages, builders, ACL payloads and identifier sanitizing

pub mod foundation;
pub mod outbox;
