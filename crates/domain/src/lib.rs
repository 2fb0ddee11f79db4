//! Core value types for the volatility simulator.
//!
//! This crate holds the data model shared by every other crate:
//! - Candles, markers and driver-feed entries consumed by renderers
//! - Volatility zones written by the event injector
//! - Symbol profiles that parameterize the candle generator
//! - The error taxonomy for all local, recoverable failures

/// Entities with identity or a fixed place in a series.
pub mod entities;
/// Closed sets of kinds, shapes and levels.
pub mod enums;
/// Domain errors.
pub mod error;
/// Immutable values derived from or attached to entities.
pub mod value_objects;

pub use error::{DomainError, DomainResult};
