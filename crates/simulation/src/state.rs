//! Read-only views of a running session.
//!
//! Snapshots are what renderers consume: the candle window, markers, the
//! zones in force and the driver feed, detached from the session so they can
//! be sent across tasks or serialized.

use serde::{Deserialize, Serialize};
use volsim_domain::entities::{Candle, FeedEntry, Marker, SymbolProfile};
use volsim_domain::enums::Severity;
use volsim_domain::value_objects::{SentimentTally, VolatilityZone};

/// Complete session state at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Capture time, UNIX seconds.
    pub taken_at: i64,
    /// Active symbol.
    pub symbol: SymbolProfile,
    /// Visible candle window, oldest first.
    pub candles: Vec<Candle>,
    /// Chart markers in creation order.
    pub markers: Vec<Marker>,
    /// Zones active at `taken_at`, oldest first.
    pub active_zones: Vec<VolatilityZone>,
    /// Driver feed, newest first.
    pub feed: Vec<FeedEntry>,
    /// Volatility the next tick will use.
    pub effective_volatility: f64,
    /// Sentiment balance of the feed.
    pub sentiment: SentimentTally,
}

impl SessionSnapshot {
    /// Newest candle in the window.
    #[must_use]
    pub fn last_candle(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Strongest active severity, used for warning banners.
    #[must_use]
    pub fn warning_level(&self) -> Option<Severity> {
        self.active_zones.iter().map(|z| z.severity).max()
    }

    /// Close of the newest candle relative to the oldest one in the window.
    #[must_use]
    pub fn window_change_pct(&self) -> f64 {
        match (self.candles.first(), self.candles.last()) {
            (Some(first), Some(last)) if first.open != 0.0 => {
                (last.close - first.open) / first.open
            }
            _ => 0.0,
        }
    }
}
