//! Concrete indicator implementations.
//!
//! Every indicator is a streaming state machine implementing the `Indicator`
//! trait from `components::indicator`. Instances are owned by exactly one
//! strategy and fed one bar at a time; no state is shared between instances.
//!
//! Multi-output indicators (bands, squeeze, cycle detector, trendline, rank
//! oscillator) return their primary value through `Indicator::update` and
//! expose the remaining outputs through dedicated `next`/accessor methods.

pub mod adaptive_t3;
pub mod atr;
pub mod bandpass;
pub mod bollinger;
pub mod coral;
pub mod ema;
pub mod itrend;
pub mod keltner;
pub mod rsi;
pub mod sma;
pub mod snr;
pub mod spearman;
pub mod squeeze;
pub mod window;

pub use adaptive_t3::AdaptiveT3;
pub use atr::{true_range, Atr};
pub use bandpass::Bandpass;
pub use bollinger::{Bands, Bollinger};
pub use coral::{CoralPoint, CoralTrend};
pub use ema::Ema;
pub use itrend::{InstantaneousTrendline, TrendlinePoint};
pub use keltner::Keltner;
pub use rsi::Rsi;
pub use sma::Sma;
pub use snr::{CyclePoint, SignalToNoise};
pub use spearman::{RankPoint, SpearmanOscillator};
pub use squeeze::{Squeeze, SqueezeMomentum, SqueezeState};
pub use window::{LagBuffer, RollingWindow};

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar::new(
                base + chrono::Duration::hours(i as i64),
                open,
                high,
                low,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Bar::new(
                base + chrono::Duration::hours(i as i64),
                open,
                high,
                low,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Deterministic pseudo-random walk with realistic OHLC spread, for tests.
#[cfg(test)]
pub fn make_walk_bars(n: usize) -> Vec<crate::domain::Bar> {
    let mut closes = Vec::with_capacity(n);
    let mut price = 100.0;
    for i in 0..n {
        let seed = (i as u64)
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let change = ((seed >> 33) % 200) as f64 / 100.0 - 1.0; // -1.0 to +0.99
        price = (price + change + (i as f64 * 0.15).sin() * 0.8).max(10.0);
        closes.push(price);
    }
    make_bars(&closes)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
