//! Keltner Channel.
//!
//! Middle = SMA(close, period)
//! Upper  = Middle + multiplier * mean(range, period)
//! Lower  = Middle - multiplier * mean(range, period)
//!
//! `range` is the true range when `use_true_range` is set, otherwise high - low.
//! The first bar has no previous close and contributes high - low either way.
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::atr::true_range;
use super::bollinger::Bands;
use super::window::RollingWindow;

#[derive(Debug, Clone)]
pub struct Keltner {
    period: usize,
    multiplier: f64,
    use_true_range: bool,
    closes: RollingWindow,
    ranges: RollingWindow,
    prev_close: Option<f64>,
    name: String,
}

impl Keltner {
    pub fn new(period: usize, multiplier: f64, use_true_range: bool) -> Self {
        assert!(period >= 1, "Keltner period must be >= 1");
        assert!(multiplier > 0.0, "Keltner multiplier must be > 0");
        Self {
            period,
            multiplier,
            use_true_range,
            closes: RollingWindow::new(period),
            ranges: RollingWindow::new(period),
            prev_close: None,
            name: format!("keltner_{period}_{multiplier}"),
        }
    }

    pub fn next_bands(&mut self, bar: &Bar) -> Option<Bands> {
        let range = if self.use_true_range {
            true_range(bar, self.prev_close)
        } else {
            bar.range()
        };
        self.prev_close = Some(bar.close);
        self.closes.push(bar.close);
        self.ranges.push(range);

        let middle = self.closes.mean()?;
        let width = self.multiplier * self.ranges.mean()?;
        Some(Bands {
            upper: middle + width,
            middle,
            lower: middle - width,
        })
    }
}

impl Indicator for Keltner {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    /// Returns the middle line.
    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.next_bands(bar).map(|b| b.middle)
    }
}
