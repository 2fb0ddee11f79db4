//! Synthetic candle generation.
//!
//! Prices follow a bounded random walk: each candle opens at the previous
//! close and moves by `price * (u - 0.5) * volatility` for a uniform
//! `u` in `[0, 1)`. Wicks extend past the body by a random fraction of the
//! same move, so every candle is well formed by construction.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use volsim_domain::entities::Candle;
use volsim_domain::{DomainError, DomainResult};

/// Width of one candle in seconds.
pub const DEFAULT_STEP_SECONDS: i64 = 60;

/// Widest accepted candle: one day.
pub const MAX_STEP_SECONDS: i64 = 86_400;

/// Source of candle histories and their one-step extensions.
pub trait CandlePathGenerator {
    /// Builds `count` candles ending one step before `now`.
    fn initial_series(
        &mut self,
        count: usize,
        start_price: f64,
        volatility: f64,
        now: i64,
    ) -> DomainResult<Vec<Candle>>;

    /// Extends the walk by one step from `last`.
    fn next_candle(&mut self, last: &Candle, effective_volatility: f64) -> Candle;
}

/// Random-walk generator over an injected random source.
#[derive(Debug, Clone)]
pub struct RandomWalk<R> {
    rng: R,
    step_seconds: i64,
}

impl<R: Rng> RandomWalk<R> {
    /// Creates a walk over `rng` with one-minute candles.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            step_seconds: DEFAULT_STEP_SECONDS,
        }
    }

    /// Sets the candle width.
    #[must_use]
    pub fn with_step_seconds(mut self, step_seconds: i64) -> Self {
        self.step_seconds = step_seconds;
        self
    }

    #[must_use]
    pub fn step_seconds(&self) -> i64 {
        self.step_seconds
    }
}

impl RandomWalk<StdRng> {
    /// Reproducible walk: the same seed always yields the same candles.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Walk seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> CandlePathGenerator for RandomWalk<R> {
    fn initial_series(
        &mut self,
        count: usize,
        start_price: f64,
        volatility: f64,
        now: i64,
    ) -> DomainResult<Vec<Candle>> {
        generate_initial_series(
            &mut self.rng,
            count,
            start_price,
            volatility,
            now,
            self.step_seconds,
        )
    }

    fn next_candle(&mut self, last: &Candle, effective_volatility: f64) -> Candle {
        next_candle(&mut self.rng, last, effective_volatility, self.step_seconds)
    }
}

/// Generates `count` consecutive candles starting from `start_price`.
///
/// Candle `i` is stamped `now - (count - i) * step_seconds`, so the series
/// ends exactly one step before `now` with no gaps.
///
/// # Errors
/// Returns [`DomainError::InvalidParameter`] when `count` is zero,
/// `start_price` is not a positive number, `volatility` is negative or not
/// finite, `step_seconds` is outside `1..=MAX_STEP_SECONDS`, or the series
/// would not fit in the `i64` timestamp range. Inputs are never clamped.
pub fn generate_initial_series<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    start_price: f64,
    volatility: f64,
    now: i64,
    step_seconds: i64,
) -> DomainResult<Vec<Candle>> {
    if count == 0 {
        return Err(DomainError::invalid("count", "must be greater than zero"));
    }
    if !(start_price.is_finite() && start_price > 0.0) {
        return Err(DomainError::invalid(
            "start_price",
            format!("must be a positive number, got {start_price}"),
        ));
    }
    validate_volatility(volatility)?;
    validate_step_seconds(step_seconds)?;

    let first_time = i64::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(step_seconds))
        .and_then(|span| now.checked_sub(span))
        .ok_or_else(|| {
            DomainError::invalid(
                "step_seconds",
                format!("{count} candles of {step_seconds}s overflow the timestamp range"),
            )
        })?;

    let mut candles = Vec::with_capacity(count);
    let mut price = start_price;
    let mut time = first_time;

    for _ in 0..count {
        let candle = walk_step(rng, time, price, volatility);
        price = candle.close;
        candles.push(candle);
        // bounded by `now` since first_time + count * step == now
        time += step_seconds;
    }

    Ok(candles)
}

/// One-step extension of the walk: opens at `last.close`, stamped one step
/// after `last.time`. The timestamp saturates at `i64::MAX`.
pub fn next_candle<R: Rng + ?Sized>(
    rng: &mut R,
    last: &Candle,
    effective_volatility: f64,
    step_seconds: i64,
) -> Candle {
    walk_step(
        rng,
        last.time.saturating_add(step_seconds),
        last.close,
        effective_volatility,
    )
}

/// Rejects candle widths outside `1..=MAX_STEP_SECONDS`.
pub fn validate_step_seconds(step_seconds: i64) -> DomainResult<()> {
    if (1..=MAX_STEP_SECONDS).contains(&step_seconds) {
        Ok(())
    } else {
        Err(DomainError::invalid(
            "step_seconds",
            format!("must be between 1 and {MAX_STEP_SECONDS}, got {step_seconds}"),
        ))
    }
}

/// Rejects negative or non-finite volatility.
pub fn validate_volatility(volatility: f64) -> DomainResult<()> {
    if volatility.is_finite() && volatility >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::invalid(
            "volatility",
            format!("must be a non-negative number, got {volatility}"),
        ))
    }
}

fn walk_step<R: Rng + ?Sized>(rng: &mut R, time: i64, price: f64, volatility: f64) -> Candle {
    let change = price * (rng.random::<f64>() - 0.5) * volatility;
    let open = price;
    let close = price + change;
    let high = open.max(close) + change.abs() * rng.random::<f64>();
    let low = open.min(close) - change.abs() * rng.random::<f64>();

    Candle::new(time, open, high, low, close)
}
