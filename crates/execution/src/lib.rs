//! Live session driver.
//!
//! This crate runs a [`volsim_simulation::session::MarketSession`] on a
//! tokio task:
//! - Periodic ticks that extend the candle series
//! - Event triggers and symbol switches sent as commands
//! - Snapshots published to any number of subscribers

/// Prelude module for convenient imports.
pub mod prelude;

/// Time sources.
pub mod clock;
/// Session controller task and its handle.
pub mod controller;
/// Controller errors.
pub mod error;

pub use error::{ControllerError, ControllerResult};
