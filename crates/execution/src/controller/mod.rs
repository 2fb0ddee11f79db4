//! Session controller.
//!
//! A single tokio task owns the [`MarketSession`] and is the only writer.
//! Ticks come from an interval, requests arrive as [`Command`]s over an
//! mpsc channel, and every state change is published as a
//! [`SessionSnapshot`] on a watch channel.

use crate::clock::Clock;
use crate::error::{ControllerError, ControllerResult};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};
use volsim_domain::DomainResult;
use volsim_domain::entities::SymbolCatalog;
use volsim_domain::enums::EventKind;
use volsim_simulation::event::TriggerOutcome;
use volsim_simulation::session::MarketSession;
use volsim_simulation::state::SessionSnapshot;

const COMMAND_BUFFER: usize = 64;

/// Requests handled by the controller task.
#[derive(Debug)]
pub enum Command {
    /// Inject an event on the latest candle.
    Trigger {
        kind: EventKind,
        reply: oneshot::Sender<DomainResult<TriggerOutcome>>,
    },
    /// Replace the session with a fresh history for another symbol.
    SwitchSymbol {
        symbol: String,
        reply: oneshot::Sender<DomainResult<()>>,
    },
    /// Read the current state.
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// Stop the task.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Owner of a running session.
pub struct SessionController<R> {
    session: MarketSession<R>,
    catalog: SymbolCatalog,
    clock: Arc<dyn Clock>,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
    ticks: u64,
}

impl<R: Rng + Send + 'static> SessionController<R> {
    /// Starts the controller task.
    ///
    /// The tick period is taken from the session's config. Symbol switches
    /// are resolved against `catalog`.
    pub fn spawn(
        session: MarketSession<R>,
        catalog: SymbolCatalog,
        clock: Arc<dyn Clock>,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(clock.now()));

        let controller = Self {
            session,
            catalog,
            clock,
            commands: command_rx,
            snapshots: snapshot_tx,
            ticks: 0,
        };
        let task = tokio::spawn(controller.run());

        let handle = ControllerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (handle, task)
    }

    async fn run(mut self) {
        let period = self.session.config().tick_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            symbol = %self.session.symbol().id,
            period_ms = period.as_millis() as u64,
            "Session controller started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown { reply }) => {
                        let _ = reply.send(());
                        break;
                    }
                    Some(command) => {
                        if self.handle(command) {
                            ticker.reset();
                        }
                    }
                    None => break,
                },
            }
        }

        info!(ticks = self.ticks, "Session controller stopped");
    }

    fn on_tick(&mut self) {
        let now = self.clock.now();
        match self.session.tick(now) {
            Ok(candle) => {
                self.ticks += 1;
                debug!(tick = self.ticks, time = candle.time, "Tick");
                self.publish(now);
            }
            Err(e) => warn!(error = %e, "Tick skipped"),
        }
    }

    /// Applies a command; returns true when the tick schedule must restart.
    fn handle(&mut self, command: Command) -> bool {
        let now = self.clock.now();
        match command {
            Command::Trigger { kind, reply } => {
                let result = self.session.trigger(kind, now);
                match &result {
                    Ok(_) => self.publish(now),
                    Err(e) => warn!(event = %kind, error = %e, "Trigger rejected"),
                }
                let _ = reply.send(result);
                false
            }
            Command::SwitchSymbol { symbol, reply } => {
                let result = self
                    .catalog
                    .get(&symbol)
                    .cloned()
                    .and_then(|profile| self.session.switch_symbol(profile, now));
                let switched = result.is_ok();
                match &result {
                    Ok(()) => self.publish(now),
                    Err(e) => warn!(symbol = %symbol, error = %e, "Symbol switch rejected"),
                }
                let _ = reply.send(result);
                switched
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot(now));
                false
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
                false
            }
        }
    }

    fn publish(&self, now: i64) {
        self.snapshots.send_replace(self.session.snapshot(now));
    }
}

/// Cloneable client for a running [`SessionController`].
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl ControllerHandle {
    /// Triggers `kind` on the latest candle.
    ///
    /// # Errors
    /// Returns [`ControllerError::Domain`] with `NoActiveSeries` when the
    /// session has no candles, or [`ControllerError::Stopped`].
    pub async fn trigger(&self, kind: EventKind) -> ControllerResult<TriggerOutcome> {
        let outcome = self
            .request(|reply| Command::Trigger { kind, reply })
            .await??;
        Ok(outcome)
    }

    /// Parses `kind` and triggers it.
    ///
    /// # Errors
    /// Returns `UnsupportedEventKind` for unknown names without contacting
    /// the controller, otherwise as [`ControllerHandle::trigger`].
    pub async fn trigger_named(&self, kind: &str) -> ControllerResult<TriggerOutcome> {
        let kind: EventKind = kind.parse()?;
        self.trigger(kind).await
    }

    /// Switches to the symbol with id `symbol`.
    ///
    /// # Errors
    /// Returns `UnknownSymbol` when the id is not in the catalog; the
    /// session is left unchanged.
    pub async fn switch_symbol(&self, symbol: impl Into<String>) -> ControllerResult<()> {
        let symbol = symbol.into();
        self.request(|reply| Command::SwitchSymbol { symbol, reply })
            .await??;
        Ok(())
    }

    /// Fresh snapshot taken by the controller.
    ///
    /// # Errors
    /// Returns [`ControllerError::Stopped`] when the task has exited.
    pub async fn snapshot(&self) -> ControllerResult<SessionSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Most recently published snapshot, without a round trip.
    pub fn latest(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// New receiver for published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the controller and waits for it to acknowledge.
    ///
    /// # Errors
    /// Returns [`ControllerError::Stopped`] when it was already stopped.
    pub async fn shutdown(&self) -> ControllerResult<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> ControllerResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| ControllerError::Stopped)?;
        reply_rx.await.map_err(|_| ControllerError::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;
    use volsim_domain::DomainError;
    use volsim_domain::enums::Severity;
    use volsim_simulation::config::SimulationConfig;

    const START: i64 = 1_700_000_000;

    fn spawn(clock: &ManualClock) -> (ControllerHandle, JoinHandle<()>) {
        let config = SimulationConfig::new().with_history_len(100).with_seed(5);
        let session =
            MarketSession::from_config(config, &SymbolCatalog::default(), clock.now()).unwrap();
        SessionController::spawn(session, SymbolCatalog::default(), Arc::new(clock.clone()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_publish_snapshots() {
        let clock = ManualClock::new(START);
        let (handle, _task) = spawn(&clock);
        let mut rx = handle.subscribe();
        let before = rx.borrow_and_update().last_candle().unwrap().time;

        rx.changed().await.unwrap();
        let first = rx.borrow_and_update().clone();
        assert_eq!(first.last_candle().unwrap().time, before + 60);
        assert_eq!(first.candles.len(), 100);

        rx.changed().await.unwrap();
        let second = rx.borrow_and_update().clone();
        assert_eq!(second.last_candle().unwrap().time, before + 120);
        assert_eq!(second.candles[0].time, first.candles[1].time);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_and_expiry() {
        let clock = ManualClock::new(START);
        let (handle, _task) = spawn(&clock);

        let outcome = handle.trigger(EventKind::Trump).await.unwrap();
        assert_eq!(outcome.zone.severity, Severity::Extreme);

        let snap = handle.latest();
        assert_eq!(snap.markers.len(), 1);
        assert_eq!(snap.markers[0].time, snap.last_candle().unwrap().time);
        assert_eq!(snap.effective_volatility, 0.005 * 5.0);

        let mut rx = handle.subscribe();
        rx.borrow_and_update();
        clock.advance(600);
        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update().clone();
        assert!(snap.active_zones.is_empty());
        assert_eq!(snap.effective_volatility, 0.005);
        assert_eq!(snap.markers.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_event_name() {
        let clock = ManualClock::new(START);
        let (handle, _task) = spawn(&clock);

        let err = handle.trigger_named("meteor").await.unwrap_err();
        assert_eq!(
            err,
            ControllerError::Domain(DomainError::UnsupportedEventKind("meteor".to_string()))
        );
        assert!(handle.trigger_named("CPI").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_symbol() {
        let clock = ManualClock::new(START);
        let (handle, _task) = spawn(&clock);
        handle.trigger(EventKind::Pump).await.unwrap();

        let err = handle.switch_symbol("DOGE/USD").await.unwrap_err();
        assert_eq!(
            err,
            ControllerError::Domain(DomainError::UnknownSymbol("DOGE/USD".to_string()))
        );
        assert_eq!(handle.snapshot().await.unwrap().symbol.id, "BTC/USD");

        clock.advance(30);
        handle.switch_symbol("NVDA").await.unwrap();
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.symbol.id, "NVDA");
        assert!(snap.markers.is_empty());
        assert!(snap.feed.is_empty());
        assert_eq!(snap.candles[0].open, 1_450.0);
        assert_eq!(snap.last_candle().unwrap().time, START + 30 - 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_restarts_tick_period() {
        let clock = ManualClock::new(START);
        let (handle, _task) = spawn(&clock);
        let mut rx = handle.subscribe();

        tokio::time::sleep(Duration::from_millis(900)).await;
        handle.switch_symbol("ETH/USD").await.unwrap();
        rx.borrow_and_update();
        let switched_at = Instant::now();

        rx.changed().await.unwrap();
        assert!(switched_at.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown() {
        let clock = ManualClock::new(START);
        let (handle, task) = spawn(&clock);

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert_eq!(
            handle.trigger(EventKind::War).await.unwrap_err(),
            ControllerError::Stopped
        );
        assert_eq!(handle.latest().symbol.id, "BTC/USD");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_session_rejects_trigger() {
        let btc = SymbolCatalog::default().get("BTC/USD").unwrap().clone();
        let session =
            MarketSession::empty(SimulationConfig::new(), btc, StdRng::seed_from_u64(1)).unwrap();
        let (handle, _task) = SessionController::spawn(
            session,
            SymbolCatalog::default(),
            Arc::new(ManualClock::new(START)),
        );

        assert_eq!(
            handle.trigger(EventKind::Cpi).await.unwrap_err(),
            ControllerError::Domain(DomainError::NoActiveSeries)
        );
    }
}
