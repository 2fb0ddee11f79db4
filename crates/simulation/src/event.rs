//! Market-moving event injection.
//!
//! Each [`EventKind`] maps to a fixed [`EventProfile`]. Triggering an event
//! produces three correlated artifacts: a chart marker on the latest candle,
//! a driver-feed entry and a volatility zone starting at the trigger time.

use volsim_domain::entities::{FeedEntry, Marker};
use volsim_domain::enums::{EventKind, Impact, MarkerShape, Sentiment, Severity};
use volsim_domain::value_objects::VolatilityZone;
use volsim_domain::{DomainError, DomainResult};

/// Default lifetime of an injected volatility zone.
pub const DEFAULT_ZONE_DURATION_MINUTES: u32 = 10;

/// Static presentation and impact settings for one event kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EventProfile {
    /// Kind this profile belongs to.
    pub kind: EventKind,
    /// Marker color as a CSS hex string.
    pub marker_color: &'static str,
    /// Marker text.
    pub marker_label: &'static str,
    /// Marker glyph; also decides above/below placement.
    pub marker_shape: MarkerShape,
    /// Severity of the zone the event opens.
    pub severity: Severity,
    /// Feed entry sentiment.
    pub sentiment: Sentiment,
    /// Feed entry impact.
    pub impact: Impact,
    /// Feed entry tags.
    pub tags: &'static [&'static str],
    /// Feed entry headline.
    pub title: &'static str,
    /// Feed entry body.
    pub description: &'static str,
}

static PROFILES: [EventProfile; 4] = [
    EventProfile {
        kind: EventKind::Trump,
        marker_color: "#ff9800",
        marker_label: "Trump Tweet",
        marker_shape: MarkerShape::ArrowDown,
        severity: Severity::Extreme,
        sentiment: Sentiment::Bearish,
        impact: Impact::High,
        tags: &["Trump", "Regulation"],
        title: "Trump Posts on X",
        description: "Former President comments on crypto regulation, sparking volatility.",
    },
    EventProfile {
        kind: EventKind::Cpi,
        marker_color: "#f44336",
        marker_label: "High CPI",
        marker_shape: MarkerShape::ArrowDown,
        severity: Severity::High,
        sentiment: Sentiment::Bearish,
        impact: Impact::High,
        tags: &["Macro", "USD"],
        title: "CPI Inflation Data",
        description: "Inflation higher than expected (3.4%), reducing rate cut odds.",
    },
    EventProfile {
        kind: EventKind::War,
        marker_color: "#ef5350",
        marker_label: "War Headlines",
        marker_shape: MarkerShape::ArrowDown,
        severity: Severity::Extreme,
        sentiment: Sentiment::Bearish,
        impact: Impact::High,
        tags: &["Geopolitics", "RiskOff"],
        title: "Conflict Escalation",
        description: "Reports of military escalation push markets into risk-off mode.",
    },
    EventProfile {
        kind: EventKind::Pump,
        marker_color: "#00e676",
        marker_label: "Musk Pump",
        marker_shape: MarkerShape::ArrowUp,
        severity: Severity::Extreme,
        sentiment: Sentiment::Bullish,
        impact: Impact::High,
        tags: &["Elon", "Meme"],
        title: "Elon Musk Tweet",
        description: "Elon Musk tweets 'Doge', market reacts instantly.",
    },
];

impl EventProfile {
    /// Profile for `kind`.
    #[must_use]
    pub fn for_kind(kind: EventKind) -> &'static EventProfile {
        match kind {
            EventKind::Trump => &PROFILES[0],
            EventKind::Cpi => &PROFILES[1],
            EventKind::War => &PROFILES[2],
            EventKind::Pump => &PROFILES[3],
        }
    }

    /// All profiles in control-panel order.
    #[must_use]
    pub fn all() -> &'static [EventProfile] {
        &PROFILES
    }
}

/// Artifacts produced by one trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerOutcome {
    /// Kind that was triggered.
    pub kind: EventKind,
    /// Marker anchored at the latest candle.
    pub marker: Marker,
    /// Entry to prepend to the driver feed.
    pub feed_entry: FeedEntry,
    /// Zone starting at the trigger time.
    pub zone: VolatilityZone,
}

/// Builds trigger artifacts from the static profile table.
#[derive(Debug, Clone)]
pub struct VolatilityInjector {
    zone_duration_minutes: u32,
}

impl VolatilityInjector {
    /// Creates an injector whose zones last `zone_duration_minutes`.
    #[must_use]
    pub fn new(zone_duration_minutes: u32) -> Self {
        Self {
            zone_duration_minutes,
        }
    }

    #[must_use]
    pub fn zone_duration_minutes(&self) -> u32 {
        self.zone_duration_minutes
    }

    /// Produces the marker, feed entry and zone for `kind`.
    ///
    /// `last_candle_time` is the time of the newest candle in the series;
    /// `now` stamps the zone and the feed entry.
    ///
    /// # Errors
    /// Returns [`DomainError::NoActiveSeries`] when there is no candle to
    /// anchor the marker to.
    pub fn trigger(
        &self,
        kind: EventKind,
        last_candle_time: Option<i64>,
        now: i64,
    ) -> DomainResult<TriggerOutcome> {
        let anchor = last_candle_time.ok_or(DomainError::NoActiveSeries)?;
        let profile = EventProfile::for_kind(kind);

        let marker = Marker::new(
            anchor,
            profile.marker_shape,
            profile.marker_color,
            profile.marker_label,
        );
        let feed_entry = FeedEntry::new(
            profile.title,
            profile.description,
            profile.sentiment,
            profile.impact,
            profile.tags.iter().map(|t| (*t).to_string()).collect(),
            now,
        );
        let zone = VolatilityZone::new(now, self.zone_duration_minutes, profile.severity);

        Ok(TriggerOutcome {
            kind,
            marker,
            feed_entry,
            zone,
        })
    }
}

impl Default for VolatilityInjector {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE_DURATION_MINUTES)
    }
}
