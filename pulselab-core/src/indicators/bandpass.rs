//! Two-pole recursive bandpass filter (Ehlers).
//!
//! beta  = cos(2π / period)
//! gamma = 1 / cos(4π · delta / period)
//! alpha = gamma - sqrt(gamma² - 1)
//! bp[i] = 0.5(1 - alpha)(x[i] - x[i-2]) + beta(1 + alpha)·bp[i-1] - alpha·bp[i-2]
//!
//! Input is the bar midpoint (high + low) / 2. The recurrence is zero-seeded
//! for i < 2 and those outputs are undefined.
//! Lookback: 2.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::window::LagBuffer;

#[derive(Debug, Clone)]
pub struct Bandpass {
    period: usize,
    delta: f64,
    alpha: f64,
    beta: f64,
    inputs: LagBuffer<3>,
    outputs: LagBuffer<2>,
    seen: usize,
    name: String,
}

impl Bandpass {
    /// `delta` must satisfy 0 < delta < period / 8 so that the filter is stable.
    pub fn new(period: usize, delta: f64) -> Self {
        assert!(period >= 2, "bandpass period must be >= 2");
        assert!(
            delta > 0.0 && delta < period as f64 / 8.0,
            "bandpass delta must be in (0, period/8)"
        );
        let p = period as f64;
        let beta = (2.0 * std::f64::consts::PI / p).cos();
        let gamma = 1.0 / (4.0 * std::f64::consts::PI * delta / p).cos();
        let alpha = gamma - (gamma * gamma - 1.0).sqrt();
        Self {
            period,
            delta,
            alpha,
            beta,
            inputs: LagBuffer::new(),
            outputs: LagBuffer::new(),
            seen: 0,
            name: format!("bandpass_{period}_{delta}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Feed an arbitrary input value.
    pub fn next(&mut self, value: f64) -> Option<f64> {
        self.inputs.push(value);
        self.seen += 1;
        if self.seen <= 2 {
            self.outputs.push(0.0);
            return None;
        }
        let bp = 0.5 * (1.0 - self.alpha) * (self.inputs.at(0) - self.inputs.at(2))
            + self.beta * (1.0 + self.alpha) * self.outputs.at(0)
            - self.alpha * self.outputs.at(1);
        self.outputs.push(bp);
        Some(bp)
    }
}

impl Indicator for Bandpass {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.next(bar.hl2())
    }
}
