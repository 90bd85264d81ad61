//! Ehlers Instantaneous Trendline.
//!
//! On the bar midpoint p:
//! - first 7 bars: it = (p0 + 2·p1 + p2) / 4, missing lags read as the first price
//! - afterwards:   it = (a - a²/4)·p0 + 0.5·a²·p1 - (a - 0.75·a²)·p2
//!                      + 2(1 - a)·it1 - (1 - a)²·it2
//!
//! The trigger line is 2·it0 - it2, defined from the third bar.
//! Lookback: 0 for the trendline.

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::window::LagBuffer;

const BOOTSTRAP_BARS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendlinePoint {
    pub itrend: f64,
    pub trigger: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct InstantaneousTrendline {
    alpha: f64,
    prices: LagBuffer<3>,
    trend: LagBuffer<3>,
    seen: usize,
    name: String,
}

impl InstantaneousTrendline {
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha < 1.0, "ITrend alpha must be in (0, 1)");
        Self {
            alpha,
            prices: LagBuffer::new(),
            trend: LagBuffer::new(),
            seen: 0,
            name: format!("itrend_{alpha}"),
        }
    }

    pub fn next_point(&mut self, price: f64) -> TrendlinePoint {
        if self.seen == 0 {
            self.prices = LagBuffer::filled(price);
        } else {
            self.prices.push(price);
        }
        let (p0, p1, p2) = (self.prices.at(0), self.prices.at(1), self.prices.at(2));

        let it = if self.seen < BOOTSTRAP_BARS {
            (p0 + 2.0 * p1 + p2) / 4.0
        } else {
            let a = self.alpha;
            (a - a * a / 4.0) * p0 + 0.5 * a * a * p1 - (a - 0.75 * a * a) * p2
                + 2.0 * (1.0 - a) * self.trend.at(0)
                - (1.0 - a).powi(2) * self.trend.at(1)
        };
        self.trend.push(it);
        self.seen += 1;

        let trigger = (self.seen >= 3).then(|| 2.0 * it - self.trend.at(2));
        TrendlinePoint { itrend: it, trigger }
    }
}

impl Indicator for InstantaneousTrendline {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        Some(self.next_point(bar.hl2()).itrend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn itrend_bootstrap_uses_first_price_for_missing_lags() {
        let mut it = InstantaneousTrendline::new(0.07);
        let p = it.next_point(10.0);
        assert_approx(p.itrend, 10.0, DEFAULT_EPSILON);
        assert_eq!(p.trigger, None);
        // (12 + 2·10 + 10) / 4
        let p = it.next_point(12.0);
        assert_approx(p.itrend, 10.5, DEFAULT_EPSILON);
        assert_eq!(p.trigger, None);
        // (14 + 2·12 + 10) / 4 = 12, trigger = 2·12 - 10
        let p = it.next_point(14.0);
        assert_approx(p.itrend, 12.0, DEFAULT_EPSILON);
        assert_approx(p.trigger.unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn itrend_constant_input_is_fixed_point() {
        let mut it = InstantaneousTrendline::new(0.07);
        let mut last = it.next_point(50.0);
        for _ in 0..100 {
            last = it.next_point(50.0);
        }
        assert_approx(last.itrend, 50.0, 1e-9);
        assert_approx(last.trigger.unwrap(), 50.0, 1e-9);
    }

    #[test]
    fn itrend_follows_a_ramp() {
        let mut it = InstantaneousTrendline::new(0.07);
        let mut last = it.next_point(0.0);
        for i in 1..300 {
            last = it.next_point(i as f64);
        }
        assert!((last.itrend - 299.0).abs() < 20.0);
        assert!(last.trigger.unwrap() > last.itrend);
    }
}
