//! Indicator trait and the append-only value series.
//!
//! Indicators are streaming: each owns its recurrence state and is fed one bar
//! at a time, in order. Every output is either undefined (still warming up)
//! or a finite number, and once defined it is never revised.

use crate::domain::Bar;

/// Trait for streaming indicators.
///
/// `update` must be called exactly once per bar, in timestamp order. The first
/// `lookback()` calls return `None` (warmup).
///
/// # Look-ahead contamination guard
/// The value returned for bar t may only depend on bars 0..=t. Replaying a
/// truncated history must reproduce the same prefix of values.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading bars for which the output is undefined.
    fn lookback(&self) -> usize;

    /// Consume the next bar and return the value for it.
    fn update(&mut self, bar: &Bar) -> Option<f64>;
}

/// Replay `bars` through `indicator` and collect every output.
///
/// Batch view over the streaming implementation, so batch and bar-by-bar
/// evaluation agree by construction.
pub fn compute<I: Indicator + ?Sized>(indicator: &mut I, bars: &[Bar]) -> Series {
    let mut series = Series::with_capacity(bars.len());
    for bar in bars {
        series.push(indicator.update(bar));
    }
    series
}

/// Append-only series of indicator values aligned 1:1 with bars.
///
/// Undefined positions are stored as NaN internally and surface as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    values: Vec<f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append the value for the next bar. Non-finite values are stored as undefined.
    pub fn push(&mut self, value: Option<f64>) {
        let stored = match value {
            Some(v) if v.is_finite() => v,
            _ => f64::NAN,
        };
        self.values.push(stored);
    }

    /// Value at `index`, or `None` if undefined or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .copied()
            .filter(|v| !v.is_nan())
    }

    /// Newest value.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().filter(|v| !v.is_nan())
    }

    /// Value `k` positions back from the newest (`ago(0)` is the newest).
    pub fn ago(&self, k: usize) -> Option<f64> {
        let index = self.values.len().checked_sub(k + 1)?;
        self.get(index)
    }

    /// Index of the first defined value.
    pub fn defined_from(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_nan())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
    }
}
