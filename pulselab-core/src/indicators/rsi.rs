//! Relative Strength Index (RSI).
//!
//! Trailing simple means of gains and losses over `period` price changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge case: avg_loss == 0 → RSI = 100 (including the no-movement case).

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::window::RollingWindow;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev: Option<f64>,
    gains: RollingWindow,
    losses: RollingWindow,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            prev: None,
            gains: RollingWindow::new(period),
            losses: RollingWindow::new(period),
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed an arbitrary input value.
    pub fn next(&mut self, value: f64) -> Option<f64> {
        let prev = self.prev.replace(value)?;
        let change = value - prev;
        self.gains.push(change.max(0.0));
        self.losses.push((-change).max(0.0));

        let avg_gain = self.gains.mean()?;
        let avg_loss = self.losses.mean()?;
        Some(rsi_from_averages(avg_gain, avg_loss))
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.next(bar.close)
    }
}
