//! Bars, the fundamental market data unit, and the append-only bar buffer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for one fixed time interval.
///
/// Immutable once appended to a [`BarSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Malformed bar input. Fatal for the run that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("bar {index}: field '{field}' is not finite ({value})")]
    NonFinite {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("bar {index}: timestamp {timestamp} does not follow previous bar at {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: NaiveDateTime,
        timestamp: NaiveDateTime,
    },
    #[error("bar {index}: high {high} is below low {low}")]
    InvertedRange { index: usize, high: f64, low: f64 },
}

impl Bar {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Midpoint of the bar's range, the usual input for the Ehlers filters.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Check the bar in isolation (finite fields, high >= low).
    ///
    /// `index` is only used to label the error.
    pub fn validate(&self, index: usize) -> Result<(), DataError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(DataError::NonFinite {
                    index,
                    field,
                    value,
                });
            }
        }
        if self.high < self.low {
            return Err(DataError::InvertedRange {
                index,
                high: self.high,
                low: self.low,
            });
        }
        Ok(())
    }
}

/// Append-only, strictly time-ordered sequence of bars.
///
/// Every bar is validated on the way in; nothing already appended is ever
/// modified. Accessors that look back further than the buffer reaches return
/// `None` rather than clamping.
#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bars: Vec::with_capacity(capacity),
        }
    }

    /// Append a bar, returning its index.
    pub fn push(&mut self, bar: Bar) -> Result<usize, DataError> {
        let index = self.bars.len();
        bar.validate(index)?;
        if let Some(previous) = self.bars.last() {
            if bar.timestamp <= previous.timestamp {
                return Err(DataError::NonIncreasingTimestamp {
                    index,
                    previous: previous.timestamp,
                    timestamp: bar.timestamp,
                });
            }
        }
        self.bars.push(bar);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Newest bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Bar `k` positions back from the newest (`ago(0)` is the newest).
    pub fn ago(&self, k: usize) -> Option<&Bar> {
        let index = self.bars.len().checked_sub(k + 1)?;
        self.bars.get(index)
    }

    /// The newest `k` bars, oldest first. `None` if fewer than `k` exist.
    pub fn last_k(&self, k: usize) -> Option<&[Bar]> {
        let start = self.bars.len().checked_sub(k)?;
        Some(&self.bars[start..])
    }

    /// Highest high over the newest `n` bars (current bar included).
    pub fn highest_high(&self, n: usize) -> Option<f64> {
        if n == 0 {
            return None;
        }
        self.last_k(n)?
            .iter()
            .map(|b| b.high)
            .reduce(f64::max)
    }

    /// Lowest low over the newest `n` bars (current bar included).
    pub fn lowest_low(&self, n: usize) -> Option<f64> {
        if n == 0 {
            return None;
        }
        self.last_k(n)?.iter().map(|b| b.low).reduce(f64::min)
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn ts(i: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(i)
    }

    fn sample_bar(i: i64) -> Bar {
        Bar::new(ts(i), 100.0, 105.0, 98.0, 103.0, 50_000.0)
    }

    #[test]
    fn push_returns_sequential_indices() {
        let mut series = BarSeries::new();
        assert_eq!(series.push(sample_bar(0)).unwrap(), 0);
        assert_eq!(series.push(sample_bar(1)).unwrap(), 1);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn rejects_non_finite_fields() {
        let mut series = BarSeries::new();
        let mut bar = sample_bar(0);
        bar.close = f64::NAN;
        let err = series.push(bar).unwrap_err();
        assert!(matches!(
            err,
            DataError::NonFinite { field: "close", .. }
        ));

        let mut bar = sample_bar(0);
        bar.volume = f64::INFINITY;
        assert!(series.push(bar).is_err());
        assert!(series.is_empty());
    }

    #[test]
    fn rejects_duplicate_and_backwards_timestamps() {
        let mut series = BarSeries::new();
        series.push(sample_bar(5)).unwrap();
        assert!(matches!(
            series.push(sample_bar(5)),
            Err(DataError::NonIncreasingTimestamp { index: 1, .. })
        ));
        assert!(series.push(sample_bar(4)).is_err());
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn rejects_inverted_range() {
        let mut bar = sample_bar(0);
        bar.high = 90.0;
        assert!(matches!(
            bar.validate(7),
            Err(DataError::InvertedRange { index: 7, .. })
        ));
    }

    #[test]
    fn gaps_are_tolerated() {
        let mut series = BarSeries::new();
        series.push(sample_bar(0)).unwrap();
        series.push(sample_bar(48)).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn ago_and_last_k() {
        let mut series = BarSeries::new();
        for i in 0..5 {
            let mut bar = sample_bar(i);
            bar.close = i as f64;
            series.push(bar).unwrap();
        }
        assert_eq!(series.ago(0).unwrap().close, 4.0);
        assert_eq!(series.ago(4).unwrap().close, 0.0);
        assert!(series.ago(5).is_none());
        let tail = series.last_k(2).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].close, 3.0);
        assert!(series.last_k(6).is_none());
    }

    #[test]
    fn rolling_extremes_require_full_window() {
        let mut series = BarSeries::new();
        let highs = [10.0, 12.0, 11.0];
        for (i, &h) in highs.iter().enumerate() {
            series
                .push(Bar::new(ts(i as i64), h - 1.0, h, h - 2.0, h - 0.5, 1.0))
                .unwrap();
        }
        assert_eq!(series.highest_high(3), Some(12.0));
        assert_eq!(series.highest_high(1), Some(11.0));
        assert_eq!(series.lowest_low(2), Some(9.0));
        assert_eq!(series.highest_high(4), None);
        assert_eq!(series.lowest_low(0), None);
    }

    #[test]
    fn hl2_is_midpoint() {
        assert_eq!(sample_bar(0).hl2(), 101.5);
        assert_eq!(sample_bar(0).range(), 7.0);
    }
}
