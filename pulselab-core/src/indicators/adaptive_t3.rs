//! RSI-adaptive T3 moving average.
//!
//! dyn_len[i] = min_len + (max_len - min_len) · (1 - RSI[i] / 100)
//! Lower RSI → longer smoothing. The cascade uses the running mean of dyn_len
//! over all defined bars so far (L̄), so alpha = 2 / (L̄ + 1) changes slowly and
//! values are never revised.
//!
//! Six cascaded EMAs (e1..e6) on close, seeded with the close at the first bar
//! where RSI is defined, combined with the T3 coefficients for volume factor v:
//!   T3 = c1·e6 + c2·e5 + c3·e4 + c4·e3
//!   c1 = -v³, c2 = 3v² + 3v³, c3 = -6v² - 3v - 3v³, c4 = 1 + 3v + v³ + 3v²
//!
//! Lookback: rsi_period.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::rsi::Rsi;

#[derive(Debug, Clone)]
pub struct AdaptiveT3 {
    rsi: Rsi,
    min_length: f64,
    max_length: f64,
    coefficients: [f64; 4],
    length_sum: f64,
    length_count: usize,
    stages: Option<[f64; 6]>,
    name: String,
}

impl AdaptiveT3 {
    pub fn new(rsi_period: usize, min_length: usize, max_length: usize, volume_factor: f64) -> Self {
        assert!(min_length >= 1, "T3 min length must be >= 1");
        assert!(
            min_length <= max_length,
            "T3 min length must be <= max length"
        );
        let v = volume_factor;
        let v2 = v * v;
        let v3 = v2 * v;
        Self {
            rsi: Rsi::new(rsi_period),
            min_length: min_length as f64,
            max_length: max_length as f64,
            coefficients: [
                -v3,
                3.0 * v2 + 3.0 * v3,
                -6.0 * v2 - 3.0 * v - 3.0 * v3,
                1.0 + 3.0 * v + v3 + 3.0 * v2,
            ],
            length_sum: 0.0,
            length_count: 0,
            stages: None,
            name: format!("adaptive_t3_{rsi_period}_{min_length}_{max_length}"),
        }
    }

    /// Mean dynamic length seen so far.
    pub fn mean_length(&self) -> Option<f64> {
        if self.length_count == 0 {
            None
        } else {
            Some(self.length_sum / self.length_count as f64)
        }
    }
}

impl Indicator for AdaptiveT3 {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.rsi.period()
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        let rsi = self.rsi.next(bar.close)?;
        let dyn_len = self.min_length + (self.max_length - self.min_length) * (1.0 - rsi / 100.0);
        self.length_sum += dyn_len;
        self.length_count += 1;
        let alpha = 2.0 / (self.mean_length()? + 1.0);

        let stages = match self.stages.as_mut() {
            Some(stages) => {
                let mut input = bar.close;
                for stage in stages.iter_mut() {
                    *stage = alpha * input + (1.0 - alpha) * *stage;
                    input = *stage;
                }
                *stages
            }
            None => *self.stages.insert([bar.close; 6]),
        };

        let [c1, c2, c3, c4] = self.coefficients;
        Some(c1 * stages[5] + c2 * stages[4] + c3 * stages[3] + c4 * stages[2])
    }
}
