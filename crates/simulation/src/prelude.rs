//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use volsim_simulation::prelude::*;
//! ```

// Configuration
pub use crate::config::{ConfigError, SimulationConfig};

// Events
pub use crate::event::{EventProfile, TriggerOutcome, VolatilityInjector};

// Feed
pub use crate::feed::DriverFeed;

// Price path generators
pub use crate::price_path::{CandlePathGenerator, RandomWalk, generate_initial_series, next_candle};

// Session
pub use crate::session::MarketSession;
pub use crate::state::SessionSnapshot;

// Zones
pub use crate::zones::{ZoneArena, ZoneId, ZoneResolution, effective_volatility};
