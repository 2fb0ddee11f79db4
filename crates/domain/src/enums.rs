use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strength of a volatility zone.
///
/// Ordered so that `Extreme > High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Extreme,
}

impl Severity {
    /// Factor applied to a symbol's base volatility while a zone of this
    /// severity is active.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Severity::High => 2.0,
            Severity::Extreme => 5.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Extreme => write!(f, "extreme"),
        }
    }
}

/// Manually injected market-moving event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Trump,
    Cpi,
    War,
    Pump,
}

impl EventKind {
    /// Every supported kind, in control-panel order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Trump,
        EventKind::Cpi,
        EventKind::War,
        EventKind::Pump,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Trump => "trump",
            EventKind::Cpi => "cpi",
            EventKind::War => "war",
            EventKind::Pump => "pump",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trump" => Ok(EventKind::Trump),
            "cpi" => Ok(EventKind::Cpi),
            "war" => Ok(EventKind::War),
            "pump" => Ok(EventKind::Pump),
            _ => Err(DomainError::UnsupportedEventKind(s.to_string())),
        }
    }
}

/// Marker glyph drawn by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
}

/// Where a marker sits relative to its bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    AboveBar,
    BelowBar,
}

impl From<MarkerShape> for MarkerPosition {
    fn from(shape: MarkerShape) -> Self {
        match shape {
            MarkerShape::ArrowUp => MarkerPosition::BelowBar,
            MarkerShape::ArrowDown => MarkerPosition::AboveBar,
        }
    }
}

/// Direction a driver-feed entry implies for price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// How strongly a driver-feed entry is expected to move the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}
