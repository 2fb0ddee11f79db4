//! Candle generation and volatility event injection.
//!
//! This crate provides the simulation core:
//! - Random-walk candle series with a fixed sliding window
//! - Event injection producing markers, feed entries and volatility zones
//! - Zone bookkeeping with expiry and overlap resolution
//! - A single-owner session with tick, trigger and symbol-switch transitions

/// Prelude module for convenient imports.
pub mod prelude;

/// Session configuration.
pub mod config;
/// Event profiles and the volatility injector.
pub mod event;
/// Driver feed.
pub mod feed;
/// Candle path generators.
pub mod price_path;
/// Market session state machine.
pub mod session;
/// Session snapshots.
pub mod state;
/// Volatility zone storage and resolution.
pub mod zones;

#[cfg(test)]
mod testing;
