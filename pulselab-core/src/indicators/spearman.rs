//! Spearman rank-correlation oscillator.
//!
//! Over the trailing `length` closes, rank the prices (ties take the mean of
//! their ranks) and correlate against time order (oldest = 1):
//!   rho = 1 - 6·Σd² / (n(n² - 1)),  clamped to [-1, 1]
//!   osc = 100·rho
//!
//! Four-level signal from the oscillator and its one-bar slope:
//!   osc >= 0: +2 if rising, else +1
//!   osc <  0: -2 if falling, else -1
//!
//! Lookback: length - 1 for the oscillator, length for the signal.

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::window::RollingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankPoint {
    pub oscillator: f64,
    pub signal: Option<i8>,
}

#[derive(Debug, Clone)]
pub struct SpearmanOscillator {
    length: usize,
    window: RollingWindow,
    prev_osc: Option<f64>,
    name: String,
}

impl SpearmanOscillator {
    pub fn new(length: usize) -> Self {
        assert!(length >= 2, "Spearman length must be >= 2");
        Self {
            length,
            window: RollingWindow::new(length),
            prev_osc: None,
            name: format!("spearman_{length}"),
        }
    }

    pub fn next_point(&mut self, close: f64) -> Option<RankPoint> {
        self.window.push(close);
        if !self.window.is_full() {
            return None;
        }
        let values: Vec<f64> = self.window.iter().copied().collect();
        let oscillator = 100.0 * spearman_rho(&values);
        let signal = self.prev_osc.map(|prev| level_signal(oscillator, prev));
        self.prev_osc = Some(oscillator);
        Some(RankPoint { oscillator, signal })
    }
}

/// Four-level directional signal from the current and previous oscillator.
pub fn level_signal(osc: f64, prev: f64) -> i8 {
    let slope = osc - prev;
    if osc >= 0.0 {
        if slope > 0.0 {
            2
        } else {
            1
        }
    } else if slope < 0.0 {
        -2
    } else {
        -1
    }
}

/// Ranks starting at 1; tied values share the mean of their positions.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end hold ranks start+1..=end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

fn spearman_rho(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let d2: f64 = average_ranks(values)
        .iter()
        .enumerate()
        .map(|(t, r)| (r - (t + 1) as f64).powi(2))
        .sum();
    (1.0 - 6.0 * d2 / (n * (n * n - 1.0))).clamp(-1.0, 1.0)
}

impl Indicator for SpearmanOscillator {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.length - 1
    }

    /// Returns the oscillator.
    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.next_point(bar.close).map(|p| p.oscillator)
    }
}
