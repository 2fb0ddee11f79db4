//! Market session: the single owner of all simulation state.
//!
//! A session holds the active symbol, the fixed-size candle window, the zone
//! arena, markers and the driver feed. Every change goes through one of three
//! transitions:
//! - [`MarketSession::tick`] appends one candle and evicts the oldest
//! - [`MarketSession::trigger`] injects an event
//! - [`MarketSession::switch_symbol`] replaces everything at once

use crate::config::SimulationConfig;
use crate::event::{TriggerOutcome, VolatilityInjector};
use crate::feed::DriverFeed;
use crate::price_path::{CandlePathGenerator, RandomWalk, validate_volatility};
use crate::state::SessionSnapshot;
use crate::zones::ZoneArena;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};
use uuid::Uuid;
use volsim_domain::entities::{Candle, Marker, SymbolCatalog, SymbolProfile};
use volsim_domain::enums::EventKind;
use volsim_domain::value_objects::VolatilityZone;
use volsim_domain::{DomainError, DomainResult};

/// Simulation state for one dashboard session.
#[derive(Debug)]
pub struct MarketSession<R = StdRng> {
    config: SimulationConfig,
    symbol: SymbolProfile,
    walk: RandomWalk<R>,
    injector: VolatilityInjector,
    candles: VecDeque<Candle>,
    zones: ZoneArena,
    markers: Vec<Marker>,
    /// Feed entry id -> index into `markers`.
    marker_by_entry: HashMap<Uuid, usize>,
    feed: DriverFeed,
}

impl MarketSession<StdRng> {
    /// Builds a session for the config's default symbol.
    ///
    /// Uses the configured seed when present, OS entropy otherwise.
    ///
    /// # Errors
    /// Returns [`DomainError::UnknownSymbol`] when the default symbol is not
    /// in `catalog`, or any error from [`MarketSession::new`].
    pub fn from_config(
        config: SimulationConfig,
        catalog: &SymbolCatalog,
        now: i64,
    ) -> DomainResult<Self> {
        let symbol = catalog.get(&config.default_symbol)?.clone();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(config, symbol, rng, now)
    }
}

impl<R: Rng> MarketSession<R> {
    /// Creates a session and generates its initial history.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidParameter`] when the config or the
    /// symbol profile is invalid.
    pub fn new(
        config: SimulationConfig,
        symbol: SymbolProfile,
        rng: R,
        now: i64,
    ) -> DomainResult<Self> {
        let mut session = Self::empty(config, symbol, rng)?;
        session.initialize(now)?;
        Ok(session)
    }

    /// Creates a session with no candle series yet.
    ///
    /// Ticks and triggers fail with [`DomainError::NoActiveSeries`] until
    /// [`MarketSession::initialize`] runs.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidParameter`] when the config or the
    /// symbol profile is invalid.
    pub fn empty(config: SimulationConfig, symbol: SymbolProfile, rng: R) -> DomainResult<Self> {
        config.validate()?;
        symbol.validate()?;

        let walk = RandomWalk::new(rng).with_step_seconds(config.step_seconds);
        let injector = VolatilityInjector::new(config.zone_duration_minutes);
        let feed = DriverFeed::new(config.feed_capacity);

        Ok(Self {
            candles: VecDeque::new(),
            config,
            symbol,
            walk,
            injector,
            zones: ZoneArena::new(),
            markers: Vec::new(),
            marker_by_entry: HashMap::new(),
            feed,
        })
    }

    /// Generates a fresh history for the current symbol, discarding any
    /// existing series, zones, markers and feed entries.
    ///
    /// # Errors
    /// Propagates generator errors; the session is unchanged on failure.
    pub fn initialize(&mut self, now: i64) -> DomainResult<()> {
        let series = self.walk.initial_series(
            self.config.history_len,
            self.symbol.base_price,
            self.symbol.base_volatility,
            now,
        )?;
        self.install(series);

        info!(
            symbol = %self.symbol.id,
            candles = self.candles.len(),
            start_price = self.symbol.base_price,
            "Candle series initialized"
        );
        Ok(())
    }

    /// Advances the series by one candle.
    ///
    /// Expired zones are swept first, then the next candle is generated with
    /// the effective volatility at `now`, appended, and the oldest candle is
    /// evicted so the window length stays constant.
    ///
    /// # Errors
    /// Returns [`DomainError::NoActiveSeries`] when there is no series.
    pub fn tick(&mut self, now: i64) -> DomainResult<Candle> {
        let last = *self.candles.back().ok_or(DomainError::NoActiveSeries)?;

        self.zones.sweep(now);
        let volatility = self.effective_volatility(now);
        let next = self.walk.next_candle(&last, volatility);

        self.candles.push_back(next);
        while self.candles.len() > self.config.history_len {
            self.candles.pop_front();
        }

        debug!(
            symbol = %self.symbol.id,
            time = next.time,
            close = next.close,
            volatility,
            "Appended candle"
        );
        Ok(next)
    }

    /// Injects an event anchored at the newest candle.
    ///
    /// Appends a marker, prepends a feed entry and opens a volatility zone
    /// starting at `now`.
    ///
    /// # Errors
    /// Returns [`DomainError::NoActiveSeries`] when there is no candle to
    /// anchor to; nothing is recorded in that case.
    pub fn trigger(&mut self, kind: EventKind, now: i64) -> DomainResult<TriggerOutcome> {
        let last_time = self.candles.back().map(|c| c.time);
        let outcome = self.injector.trigger(kind, last_time, now)?;

        self.marker_by_entry
            .insert(outcome.feed_entry.id, self.markers.len());
        self.markers.push(outcome.marker.clone());
        if let Some(dropped) = self.feed.push(outcome.feed_entry.clone()) {
            self.marker_by_entry.remove(&dropped.id);
        }
        self.zones.insert(outcome.zone);

        info!(
            symbol = %self.symbol.id,
            event = %kind,
            severity = %outcome.zone.severity,
            anchor = outcome.marker.time,
            "Event triggered"
        );
        Ok(outcome)
    }

    /// Switches to `symbol`, replacing the series and clearing zones,
    /// markers and the feed in one step.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidParameter`] for an invalid profile; the
    /// session keeps its previous symbol and state in that case.
    pub fn switch_symbol(&mut self, symbol: SymbolProfile, now: i64) -> DomainResult<()> {
        symbol.validate()?;
        let series = self.walk.initial_series(
            self.config.history_len,
            symbol.base_price,
            symbol.base_volatility,
            now,
        )?;

        let previous = std::mem::replace(&mut self.symbol, symbol);
        self.install(series);

        info!(
            from = %previous.id,
            to = %self.symbol.id,
            start_price = self.symbol.base_price,
            "Symbol switched"
        );
        Ok(())
    }

    /// Base volatility of the symbol scaled by the zones in force at `now`.
    #[must_use]
    pub fn effective_volatility(&self, now: i64) -> f64 {
        self.symbol.base_volatility * self.zones.multiplier(now, self.config.zone_resolution)
    }

    /// Overrides the active symbol's base volatility.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidParameter`] for negative or non-finite
    /// values.
    pub fn set_base_volatility(&mut self, volatility: f64) -> DomainResult<()> {
        validate_volatility(volatility)?;
        self.symbol.base_volatility = volatility;
        Ok(())
    }

    /// Marker created by the same trigger as the feed entry `entry_id`.
    ///
    /// Returns `None` once the entry has been dropped from the feed.
    #[must_use]
    pub fn marker_for_feed_entry(&self, entry_id: Uuid) -> Option<&Marker> {
        self.marker_by_entry
            .get(&entry_id)
            .and_then(|&idx| self.markers.get(idx))
    }

    /// Detached copy of everything a renderer needs.
    #[must_use]
    pub fn snapshot(&self, now: i64) -> SessionSnapshot {
        SessionSnapshot {
            taken_at: now,
            symbol: self.symbol.clone(),
            candles: self.candles.iter().copied().collect(),
            markers: self.markers.clone(),
            active_zones: self.zones.active(now),
            feed: self.feed.to_vec(),
            effective_volatility: self.effective_volatility(now),
            sentiment: self.feed.tally(),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &SymbolProfile {
        &self.symbol
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Candle window, oldest first.
    pub fn candles(&self) -> impl ExactSizeIterator<Item = &Candle> {
        self.candles.iter()
    }

    #[must_use]
    pub fn last_candle(&self) -> Option<&Candle> {
        self.candles.back()
    }

    #[must_use]
    pub fn has_series(&self) -> bool {
        !self.candles.is_empty()
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Zones in force at `now`, oldest first.
    #[must_use]
    pub fn active_zones(&self, now: i64) -> Vec<VolatilityZone> {
        self.zones.active(now)
    }

    /// Number of zones still stored, expired or not.
    #[must_use]
    pub fn stored_zone_count(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn feed(&self) -> &DriverFeed {
        &self.feed
    }

    fn install(&mut self, series: Vec<Candle>) {
        self.candles.clear();
        self.candles.extend(series);
        self.zones.clear();
        self.markers.clear();
        self.marker_by_entry.clear();
        self.feed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ConstantRng;
    use crate::zones::ZoneResolution;
    use volsim_domain::enums::{Impact, MarkerShape, Sentiment, Severity};

    const NOW: i64 = 1_700_000_000;

    fn config() -> SimulationConfig {
        SimulationConfig::new().with_history_len(50).with_seed(11)
    }

    fn btc() -> SymbolProfile {
        SymbolCatalog::default().get("BTC/USD").unwrap().clone()
    }

    fn seeded_session() -> MarketSession {
        MarketSession::from_config(config(), &SymbolCatalog::default(), NOW).unwrap()
    }

    #[test]
    fn test_new_session_has_full_window() {
        let session = seeded_session();
        assert_eq!(session.candles().len(), 50);
        assert_eq!(session.last_candle().unwrap().time, NOW - 60);
        assert_eq!(session.symbol().id, "BTC/USD");
        assert!(session.markers().is_empty());
        assert!(session.feed().is_empty());
    }

    #[test]
    fn test_tick_slides_window() {
        let mut session = seeded_session();
        let first_before = *session.candles().next().unwrap();
        let last_before = *session.last_candle().unwrap();

        let next = session.tick(NOW + 1).unwrap();

        assert_eq!(session.candles().len(), 50);
        assert_eq!(next.time, last_before.time + 60);
        assert_eq!(next.open, last_before.close);
        assert_eq!(*session.last_candle().unwrap(), next);
        assert_ne!(*session.candles().next().unwrap(), first_before);
    }

    #[test]
    fn test_pump_scenario() {
        // half-uniform source: flat candles with last time fixed by NOW
        let mut session =
            MarketSession::new(config(), btc(), ConstantRng::half(), 1_060).unwrap();
        assert_eq!(session.last_candle().unwrap().time, 1_000);

        let outcome = session.trigger(EventKind::Pump, 1_060).unwrap();

        assert_eq!(session.markers().len(), 1);
        assert_eq!(session.markers()[0].time, 1_000);
        assert_eq!(session.markers()[0].shape, MarkerShape::ArrowUp);

        let latest = session.feed().latest().unwrap();
        assert_eq!(latest.sentiment, Sentiment::Bullish);
        assert_eq!(latest.impact, Impact::High);
        assert_eq!(latest.id, outcome.feed_entry.id);

        let base = session.symbol().base_volatility;
        assert_eq!(session.effective_volatility(1_060), base * 5.0);
        assert_eq!(session.effective_volatility(1_060 + 599), base * 5.0);
        assert_eq!(session.effective_volatility(1_060 + 600), base);
    }

    #[test]
    fn test_boosted_tick_uses_multiplied_volatility() {
        // u = 0 -> change = -0.5 * price * volatility
        let mut session =
            MarketSession::new(config(), btc(), ConstantRng::zero(), NOW).unwrap();
        let price = session.last_candle().unwrap().close;

        session.trigger(EventKind::Trump, NOW).unwrap();
        let boosted = session.tick(NOW + 1).unwrap();
        let expected = price * -0.5 * 0.005 * 5.0;
        assert!((boosted.close - boosted.open - expected).abs() < 1e-6);

        let calm = session.tick(NOW + 601).unwrap();
        let expected = boosted.close * -0.5 * 0.005;
        assert!((calm.close - calm.open - expected).abs() < 1e-6);
        assert_eq!(session.stored_zone_count(), 0);
    }

    #[test]
    fn test_trigger_without_series_changes_nothing() {
        let mut session = MarketSession::empty(config(), btc(), ConstantRng::half()).unwrap();

        let err = session.trigger(EventKind::Cpi, NOW).unwrap_err();
        assert_eq!(err, DomainError::NoActiveSeries);
        assert!(session.markers().is_empty());
        assert!(session.feed().is_empty());
        assert!(session.active_zones(NOW).is_empty());
        assert!(!session.has_series());

        assert_eq!(session.tick(NOW).unwrap_err(), DomainError::NoActiveSeries);
    }

    #[test]
    fn test_switch_symbol_resets_everything() {
        let mut session = seeded_session();
        session.trigger(EventKind::Trump, NOW).unwrap();
        session.trigger(EventKind::Cpi, NOW).unwrap();
        session.tick(NOW + 1).unwrap();

        let eth = SymbolCatalog::default().get("ETH/USD").unwrap().clone();
        session.switch_symbol(eth, NOW + 2).unwrap();

        assert_eq!(session.symbol().id, "ETH/USD");
        assert!(session.markers().is_empty());
        assert!(session.feed().is_empty());
        assert!(session.active_zones(NOW + 2).is_empty());
        assert_eq!(session.candles().len(), 50);
        assert_eq!(session.candles().next().unwrap().open, 3_200.0);
        assert_eq!(session.last_candle().unwrap().time, NOW + 2 - 60);
    }

    #[test]
    fn test_rejected_switch_keeps_state() {
        let mut session = seeded_session();
        session.trigger(EventKind::Pump, NOW).unwrap();
        let before = session.snapshot(NOW);

        let bad = SymbolProfile::new("BAD", "Bad", -1.0, 0.01);
        assert!(session.switch_symbol(bad, NOW + 1).is_err());
        assert_eq!(session.snapshot(NOW), before);
    }

    #[test]
    fn test_max_severity_beats_insertion_order() {
        let mut session = seeded_session();
        session.trigger(EventKind::Cpi, NOW).unwrap();
        session.trigger(EventKind::Pump, NOW + 10).unwrap();
        let base = session.symbol().base_volatility;
        assert_eq!(session.effective_volatility(NOW + 20), base * 5.0);

        let config = config().with_zone_resolution(ZoneResolution::FirstMatch);
        let mut first_match =
            MarketSession::from_config(config, &SymbolCatalog::default(), NOW).unwrap();
        first_match.trigger(EventKind::Cpi, NOW).unwrap();
        first_match.trigger(EventKind::Pump, NOW + 10).unwrap();
        assert_eq!(first_match.effective_volatility(NOW + 20), base * 2.0);
    }

    #[test]
    fn test_marker_lookup_from_feed_entry() {
        let mut session = seeded_session();
        let cpi = session.trigger(EventKind::Cpi, NOW).unwrap();
        session.tick(NOW + 1).unwrap();
        let pump = session.trigger(EventKind::Pump, NOW + 1).unwrap();

        assert_eq!(
            session.marker_for_feed_entry(cpi.feed_entry.id).unwrap().label,
            "High CPI"
        );
        assert_eq!(
            session.marker_for_feed_entry(pump.feed_entry.id).unwrap().time,
            NOW
        );
        assert!(session.marker_for_feed_entry(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_marker_lookup_ends_when_feed_drops_entry() {
        let config = config().with_feed_capacity(2);
        let mut session =
            MarketSession::from_config(config, &SymbolCatalog::default(), NOW).unwrap();
        let first = session.trigger(EventKind::Cpi, NOW).unwrap();
        let second = session.trigger(EventKind::War, NOW).unwrap();
        let third = session.trigger(EventKind::Pump, NOW).unwrap();

        assert_eq!(session.feed().len(), 2);
        assert!(session.feed().get(first.feed_entry.id).is_none());
        assert!(session.marker_for_feed_entry(first.feed_entry.id).is_none());
        assert_eq!(
            session.marker_for_feed_entry(second.feed_entry.id).unwrap().label,
            "War Headlines"
        );
        assert_eq!(
            session.marker_for_feed_entry(third.feed_entry.id).unwrap().label,
            "Musk Pump"
        );
        assert_eq!(session.markers().len(), 3);
    }

    #[test]
    fn test_oversized_step_rejected_at_construction() {
        let config = SimulationConfig::new()
            .with_step_seconds(i64::MAX / 2)
            .with_seed(1);
        let err = MarketSession::from_config(config, &SymbolCatalog::default(), 0).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidParameter {
                name: "step_seconds",
                ..
            }
        ));
    }

    #[test]
    fn test_snapshot_contents() {
        let mut session = seeded_session();
        session.trigger(EventKind::War, NOW).unwrap();
        session.trigger(EventKind::Pump, NOW).unwrap();

        let snap = session.snapshot(NOW + 30);
        assert_eq!(snap.candles.len(), 50);
        assert_eq!(snap.markers.len(), 2);
        assert_eq!(snap.active_zones.len(), 2);
        assert_eq!(snap.feed[0].title, "Elon Musk Tweet");
        assert_eq!(snap.warning_level(), Some(Severity::Extreme));
        assert_eq!(snap.sentiment.bullish, 1);
        assert_eq!(snap.sentiment.bearish, 1);
        assert_eq!(snap.effective_volatility, 0.005 * 5.0);
    }

    #[test]
    fn test_base_volatility_override() {
        let mut session = seeded_session();
        session.set_base_volatility(0.01).unwrap();
        assert_eq!(session.effective_volatility(NOW), 0.01);
        assert!(session.set_base_volatility(-0.01).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = SimulationConfig::new().with_history_len(0);
        let err = MarketSession::new(bad, btc(), ConstantRng::half(), NOW).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidParameter {
                name: "history_len",
                ..
            }
        ));
    }
}
