use crate::enums::{MarkerPosition, MarkerShape};
use serde::{Deserialize, Serialize};

/// Chart annotation pinned to a candle's time.
///
/// Markers are created together with a volatility zone and are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Time of the candle the marker is anchored to.
    pub time: i64,
    pub position: MarkerPosition,
    /// CSS hex color, e.g. `#00e676`.
    pub color: String,
    pub shape: MarkerShape,
    #[serde(rename = "text")]
    pub label: String,
}

impl Marker {
    /// Creates a marker whose position is derived from its shape.
    pub fn new(
        time: i64,
        shape: MarkerShape,
        color: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            time,
            position: MarkerPosition::from(shape),
            color: color.into(),
            shape,
            label: label.into(),
        }
    }
}
