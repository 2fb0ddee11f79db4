//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use volsim_execution::prelude::*;
//! ```

// Clocks
pub use crate::clock::{Clock, ManualClock, SystemClock};

// Controller
pub use crate::controller::{Command, ControllerHandle, SessionController};

// Errors
pub use crate::error::{ControllerError, ControllerResult};
