//! Foundation module - Shared domain primitives.
//!
//! Contains the identifiers, timestamps, and error types that form the
//! vocabulary of the outbox domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::EventId;
pub use timestamp::Timestamp;
