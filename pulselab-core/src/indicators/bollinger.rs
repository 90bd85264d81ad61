//! Bollinger Bands.
//!
//! Middle = SMA(close, period)
//! Upper  = Middle + k * stddev(close, period)
//! Lower  = Middle - k * stddev(close, period)
//!
//! Population standard deviation (divide by N).
//! Lookback: period - 1.

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::window::RollingWindow;

/// One set of band values for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl Bands {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    window: RollingWindow,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        assert!(multiplier > 0.0, "Bollinger multiplier must be > 0");
        Self {
            period,
            multiplier,
            window: RollingWindow::new(period),
            name: format!("bollinger_{period}_{multiplier}"),
        }
    }

    /// Feed the next close and return all three bands.
    pub fn next_bands(&mut self, close: f64) -> Option<Bands> {
        self.window.push(close);
        let middle = self.window.mean()?;
        let width = self.multiplier * self.window.std_dev()?;
        Some(Bands {
            upper: middle + width,
            middle,
            lower: middle - width,
        })
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    /// Returns the middle band.
    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.next_bands(bar.close).map(|b| b.middle)
    }
}
