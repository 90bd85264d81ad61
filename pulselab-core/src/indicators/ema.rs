//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1)
//! Seed: EMA[0] = x[0].
//! Lookback: 0.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    prev: Option<f64>,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            prev: None,
            name: format!("ema_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed an arbitrary input value.
    pub fn next(&mut self, value: f64) -> Option<f64> {
        let ema = match self.prev {
            None => value,
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
        };
        self.prev = Some(ema);
        Some(ema)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.next(bar.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::indicator::compute;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = compute(&mut Ema::new(1), &bars);
        assert_approx(result.get(0).unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(result.get(1).unwrap(), 200.0, DEFAULT_EPSILON);
        assert_approx(result.get(2).unwrap(), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // Closes: 10, 12, 14, 16
        // alpha = 2/(3+1) = 0.5
        // EMA[0] = 10 (seed)
        // EMA[1] = 0.5*12 + 0.5*10 = 11
        // EMA[2] = 0.5*14 + 0.5*11 = 12.5
        // EMA[3] = 0.5*16 + 0.5*12.5 = 14.25
        let bars = make_bars(&[10.0, 12.0, 14.0, 16.0]);
        let result = compute(&mut Ema::new(3), &bars);
        assert_approx(result.get(0).unwrap(), 10.0, DEFAULT_EPSILON);
        assert_approx(result.get(1).unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(result.get(2).unwrap(), 12.5, DEFAULT_EPSILON);
        assert_approx(result.get(3).unwrap(), 14.25, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_step_converges_without_overshoot() {
        let mut ema = Ema::new(5);
        ema.next(10.0);
        let mut prev = 10.0;
        for _ in 0..50 {
            let v = ema.next(20.0).unwrap();
            assert!(v >= prev && v <= 20.0);
            prev = v;
        }
        assert!((20.0 - prev).abs() < 1e-6);
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 0);
        assert_eq!(Ema::new(20).name(), "ema_20");
    }
}
