//! Command Line Interface for the volatility simulator.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use volsim_domain::entities::{Candle, SymbolCatalog};
use volsim_domain::enums::EventKind;
use volsim_execution::prelude::*;
use volsim_simulation::prelude::*;

#[derive(Parser)]
#[command(name = "volsim")]
#[command(about = "Synthetic candle generator and volatility event simulator", long_about = None)]
struct Cli {
    /// JSON config file; defaults apply to missing fields
    #[arg(short, long, global = true, env = "VOLSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Fixed RNG seed, overrides the config
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Candles kept in the session window, overrides the config
    #[arg(long, global = true)]
    history: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available symbols
    Symbols,
    /// Print a freshly generated history
    Generate {
        /// Symbol id (e.g., BTC/USD)
        #[arg(short, long, default_value = "BTC/USD")]
        symbol: String,

        /// Number of candles
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run a live session and fire scripted events
    Run {
        /// Symbol id (e.g., BTC/USD)
        #[arg(short, long, default_value = "BTC/USD")]
        symbol: String,

        /// Number of ticks to run
        #[arg(short, long, default_value_t = 10)]
        ticks: u64,

        /// Event to fire after a tick, as kind@tick (e.g., pump@3)
        #[arg(long = "trigger")]
        triggers: Vec<ScheduledTrigger>,

        /// Tick period in milliseconds, overrides the config
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Event fired once `tick` candles have been produced; tick 0 fires
/// before the first one.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledTrigger {
    kind: EventKind,
    tick: u64,
}

impl FromStr for ScheduledTrigger {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (kind, tick) = s
            .split_once('@')
            .ok_or_else(|| format!("expected kind@tick, got '{s}'"))?;
        let kind = kind.parse::<EventKind>().map_err(|e| e.to_string())?;
        let tick = tick
            .parse::<u64>()
            .map_err(|e| format!("invalid tick '{tick}': {e}"))?;
        Ok(Self { kind, tick })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(history) = cli.history {
        config = config.with_history_len(history);
    }
    let catalog = SymbolCatalog::default();

    match cli.command {
        Commands::Symbols => {
            println!(
                "{:<10} | {:<10} | {:>12} | {:>10}",
                "Id", "Name", "Base Price", "Volatility"
            );
            println!("{}", "-".repeat(50));
            for profile in catalog.profiles() {
                println!(
                    "{:<10} | {:<10} | {:>12.2} | {:>9.2}%",
                    profile.id,
                    profile.display_name,
                    profile.base_price,
                    profile.base_volatility * 100.0
                );
            }
        }
        Commands::Generate {
            symbol,
            count,
            json,
        } => {
            let profile = catalog.get(&symbol)?;
            let mut walk = match config.seed {
                Some(seed) => RandomWalk::seeded(seed),
                None => RandomWalk::from_entropy(),
            }
            .with_step_seconds(config.step_seconds);

            let now = SystemClock.now();
            let candles =
                walk.initial_series(count, profile.base_price, profile.base_volatility, now)?;
            info!(symbol = %profile.id, count = candles.len(), "Generated history");

            if json {
                println!("{}", serde_json::to_string_pretty(&candles)?);
            } else {
                print_candle_header();
                for candle in &candles {
                    print_candle(candle);
                }
            }
        }
        Commands::Run {
            symbol,
            ticks,
            triggers,
            tick_ms,
            json,
        } => {
            let mut config = config.with_default_symbol(symbol);
            if let Some(ms) = tick_ms {
                config = config.with_tick_interval_ms(ms);
            }
            config.validate()?;
            run_session(config, catalog, ticks, &triggers, json).await?;
        }
    }

    Ok(())
}

async fn run_session(
    config: SimulationConfig,
    catalog: SymbolCatalog,
    ticks: u64,
    triggers: &[ScheduledTrigger],
    json: bool,
) -> Result<()> {
    let clock = Arc::new(SystemClock);
    let session = MarketSession::from_config(config, &catalog, clock.now())?;
    if !json {
        println!(
            "🚀 Running {} for {} ticks...",
            session.symbol().display_name,
            ticks
        );
    }

    let (handle, task) = SessionController::spawn(session, catalog, clock.clone());
    let mut rx = handle.subscribe();
    let mut last_time = rx
        .borrow_and_update()
        .last_candle()
        .map(|c| c.time)
        .unwrap_or_default();

    fire_triggers(&handle, triggers, 0, !json).await;
    if !json {
        print_candle_header();
    }

    let mut produced = 0;
    while produced < ticks {
        rx.changed().await?;
        // watch keeps only the latest value, so one change may carry several
        // candles; trigger-only publishes carry none
        let fresh = fresh_candles(&rx.borrow_and_update(), last_time).to_vec();

        for candle in fresh {
            if produced == ticks {
                break;
            }
            last_time = candle.time;
            produced += 1;

            if !json {
                print_candle(&candle);
            }
            fire_triggers(&handle, triggers, produced, !json).await;
        }
    }

    let snapshot = handle.snapshot().await?;
    handle.shutdown().await?;
    task.await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let now = clock.now();
    println!("\n📰 Market Drivers");
    println!("════════════════════════════════════");
    if snapshot.feed.is_empty() {
        println!("No events.");
    }
    for entry in &snapshot.feed {
        println!(
            "[{:>8}] {} ({:?}, {:?} impact)",
            entry.age_label(now),
            entry.title,
            entry.sentiment,
            entry.impact
        );
        println!("           {}", entry.description);
    }
    println!("════════════════════════════════════");
    println!(
        "Sentiment:       {}% bullish / {}% bearish",
        snapshot.sentiment.bullish_pct(),
        snapshot.sentiment.bearish_pct()
    );
    println!(
        "Window Change:   {:.2}%",
        snapshot.window_change_pct() * 100.0
    );
    println!(
        "Volatility:      {:.3}%",
        snapshot.effective_volatility * 100.0
    );
    if let Some(level) = snapshot.warning_level() {
        println!("Warning:         {level} volatility zone active");
    }

    Ok(())
}

async fn fire_triggers(
    handle: &ControllerHandle,
    triggers: &[ScheduledTrigger],
    tick: u64,
    announce: bool,
) {
    for scheduled in triggers.iter().filter(|t| t.tick == tick) {
        match handle.trigger(scheduled.kind).await {
            Ok(outcome) if announce => println!(
                "⚡ {} ({} zone for {} min)",
                outcome.marker.label, outcome.zone.severity, outcome.zone.duration_minutes
            ),
            Ok(_) => {}
            Err(e) => warn!(event = %scheduled.kind, tick, error = %e, "Trigger failed"),
        }
    }
}

/// Candles in the window newer than `last_time`, oldest first.
fn fresh_candles(snapshot: &SessionSnapshot, last_time: i64) -> &[Candle] {
    let start = snapshot.candles.partition_point(|c| c.time <= last_time);
    &snapshot.candles[start..]
}

fn print_candle_header() {
    println!(
        "{:<20} | {:<12} | {:<12} | {:<12} | {:<12}",
        "Time", "Open", "High", "Low", "Close"
    );
    println!("{}", "-".repeat(80));
}

fn print_candle(candle: &Candle) {
    let datetime = chrono::DateTime::from_timestamp(candle.time, 0).unwrap_or_default();
    println!(
        "{:<20} | {:<12.4} | {:<12.4} | {:<12.4} | {:<12.4}",
        datetime.format("%Y-%m-%d %H:%M"),
        candle.open,
        candle.high,
        candle.low,
        candle.close
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheduled_trigger() {
        assert_eq!(
            "pump@3".parse::<ScheduledTrigger>().unwrap(),
            ScheduledTrigger {
                kind: EventKind::Pump,
                tick: 3
            }
        );
        assert_eq!(
            "CPI@0".parse::<ScheduledTrigger>().unwrap().kind,
            EventKind::Cpi
        );
        assert!("pump".parse::<ScheduledTrigger>().is_err());
        assert!("meteor@1".parse::<ScheduledTrigger>().is_err());
        assert!("war@soon".parse::<ScheduledTrigger>().is_err());
    }

    #[test]
    fn test_fresh_candles_covers_coalesced_ticks() {
        use volsim_domain::entities::SymbolProfile;
        use volsim_domain::value_objects::SentimentTally;

        let snapshot = SessionSnapshot {
            taken_at: 240,
            symbol: SymbolProfile::new("BTC/USD", "Bitcoin", 100.0, 0.01),
            candles: [60, 120, 180, 240]
                .into_iter()
                .map(|t| Candle::new(t, 1.0, 1.0, 1.0, 1.0))
                .collect(),
            markers: Vec::new(),
            active_zones: Vec::new(),
            feed: Vec::new(),
            effective_volatility: 0.01,
            sentiment: SentimentTally::default(),
        };

        let times: Vec<i64> = fresh_candles(&snapshot, 120).iter().map(|c| c.time).collect();
        assert_eq!(times, vec![180, 240]);
        assert!(fresh_candles(&snapshot, 240).is_empty());
        assert_eq!(fresh_candles(&snapshot, 0).len(), 4);
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "volsim", "--seed", "7", "run", "--symbol", "ETH/USD", "--ticks", "5", "--trigger",
            "trump@1", "--trigger", "pump@4",
        ])
        .unwrap();

        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Commands::Run {
                symbol,
                ticks,
                triggers,
                ..
            } => {
                assert_eq!(symbol, "ETH/USD");
                assert_eq!(ticks, 5);
                assert_eq!(triggers.len(), 2);
                assert_eq!(triggers[1].kind, EventKind::Pump);
            }
            _ => panic!("expected run"),
        }
    }
}
