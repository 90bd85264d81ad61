//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR is the trailing simple mean of true range over `period` bars.
//! The first bar has no previous close, so its partial range is not used.
//! Lookback: period.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::window::RollingWindow;

/// True range of a bar. Without a previous close it degrades to high - low.
pub fn true_range(bar: &Bar, prev_close: Option<f64>) -> f64 {
    let hl = bar.high - bar.low;
    match prev_close {
        None => hl,
        Some(pc) => hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
    }
}

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    window: RollingWindow,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            window: RollingWindow::new(period),
            name: format!("atr_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        let prev_close = self.prev_close.replace(bar.close)?;
        self.window.push(true_range(bar, Some(prev_close)));
        self.window.mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::indicator::compute;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        assert_approx(true_range(&bars[0], None), 10.0, DEFAULT_EPSILON);
        assert_approx(true_range(&bars[1], Some(102.0)), 8.0, DEFAULT_EPSILON);
        assert_approx(true_range(&bars[2], Some(106.0)), 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        // Gap up: prev close 100, current bar 110-115-108
        let bars = make_ohlc_bars(&[(110.0, 115.0, 108.0, 112.0)]);
        // TR = max(7, |115-100|, |108-100|) = 15
        assert_approx(true_range(&bars[0], Some(100.0)), 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_period_3() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),  // no prev close → skipped
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6
        ]);
        let result = compute(&mut Atr::new(3), &bars);

        assert_eq!(result.get(0), None);
        assert_eq!(result.get(1), None);
        assert_eq!(result.get(2), None);
        assert_approx(result.get(3).unwrap(), 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(result.get(4).unwrap(), 21.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_lookback() {
        assert_eq!(Atr::new(14).lookback(), 14);
    }
}
