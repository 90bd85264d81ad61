//! Volatility squeeze and squeeze momentum.
//!
//! Squeeze compares Bollinger Bands against a Keltner Channel on the same bar:
//! - On:  BB lower > KC lower and BB upper < KC upper (strictly inside)
//! - Off: BB lower < KC lower and BB upper > KC upper (strictly outside)
//! - Neutral otherwise.
//!
//! Momentum is the least-squares line over the last `length` deviations of
//! close from the blended midline avg(avg(highest high, lowest low), SMA close),
//! evaluated at the window's last position.
//! Lookback: 2 * (length - 1).

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::bollinger::Bollinger;
use super::keltner::Keltner;
use super::window::RollingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqueezeState {
    On,
    Off,
    Neutral,
}

impl SqueezeState {
    fn as_f64(self) -> f64 {
        match self {
            SqueezeState::On => 1.0,
            SqueezeState::Off => -1.0,
            SqueezeState::Neutral => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Squeeze {
    bollinger: Bollinger,
    keltner: Keltner,
    lookback: usize,
}

impl Squeeze {
    pub fn new(
        bb_length: usize,
        bb_mult: f64,
        kc_length: usize,
        kc_mult: f64,
        use_true_range: bool,
    ) -> Self {
        Self {
            bollinger: Bollinger::new(bb_length, bb_mult),
            keltner: Keltner::new(kc_length, kc_mult, use_true_range),
            lookback: bb_length.max(kc_length) - 1,
        }
    }

    pub fn next_state(&mut self, bar: &Bar) -> Option<SqueezeState> {
        // Both sides must see every bar, even while the other is warming up.
        let bb = self.bollinger.next_bands(bar.close);
        let kc = self.keltner.next_bands(bar);
        let (bb, kc) = (bb?, kc?);

        let state = if bb.lower > kc.lower && bb.upper < kc.upper {
            SqueezeState::On
        } else if bb.lower < kc.lower && bb.upper > kc.upper {
            SqueezeState::Off
        } else {
            SqueezeState::Neutral
        };
        Some(state)
    }
}

impl Indicator for Squeeze {
    fn name(&self) -> &str {
        "squeeze"
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    /// On = 1, Off = -1, Neutral = 0.
    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.next_state(bar).map(SqueezeState::as_f64)
    }
}

#[derive(Debug, Clone)]
pub struct SqueezeMomentum {
    length: usize,
    highs: RollingWindow,
    lows: RollingWindow,
    closes: RollingWindow,
    deviations: RollingWindow,
    name: String,
}

impl SqueezeMomentum {
    pub fn new(length: usize) -> Self {
        assert!(length >= 2, "squeeze momentum length must be >= 2");
        Self {
            length,
            highs: RollingWindow::new(length),
            lows: RollingWindow::new(length),
            closes: RollingWindow::new(length),
            deviations: RollingWindow::new(length),
            name: format!("squeeze_momentum_{length}"),
        }
    }
}

impl Indicator for SqueezeMomentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * (self.length - 1)
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.highs.push(bar.high);
        self.lows.push(bar.low);
        self.closes.push(bar.close);

        let highest = self.highs.max()?;
        let lowest = self.lows.min()?;
        let sma = self.closes.mean()?;
        let midline = ((highest + lowest) / 2.0 + sma) / 2.0;
        self.deviations.push(bar.close - midline);

        if !self.deviations.is_full() {
            return None;
        }
        linreg_last(self.deviations.iter().copied(), self.length)
    }
}

/// OLS fit of `values` against x = 0..n, evaluated at x = n - 1.
fn linreg_last(values: impl Iterator<Item = f64>, n: usize) -> Option<f64> {
    let nf = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (x, y) in values.enumerate() {
        let x = x as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denom = nf * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        return None;
    }
    let slope = (nf * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / nf;
    Some(intercept + slope * (nf - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::indicator::compute;
    use crate::indicators::{assert_approx, make_bars, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn linreg_on_a_line_returns_last_point() {
        let value = linreg_last([1.0, 3.0, 5.0, 7.0].into_iter(), 4).unwrap();
        assert_approx(value, 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn linreg_smooths_noise() {
        // y = 0, 2, 1 → slope 0.5, intercept 0.5, at x=2: 1.5
        let value = linreg_last([0.0, 2.0, 1.0].into_iter(), 3).unwrap();
        assert_approx(value, 1.5, DEFAULT_EPSILON);
    }

    #[test]
    fn squeeze_on_for_tight_closes_in_wide_bars() {
        // Identical closes → zero BB width; wide bars → positive KC width.
        let bars = make_ohlc_bars(&[(100.0, 110.0, 90.0, 100.0); 5]);
        let mut sq = Squeeze::new(3, 2.0, 3, 1.5, true);
        let states: Vec<_> = bars.iter().map(|b| sq.next_state(b)).collect();
        assert_eq!(states[0], None);
        assert_eq!(states[1], None);
        assert_eq!(states[2], Some(SqueezeState::On));
        assert_eq!(states[4], Some(SqueezeState::On));
    }

    #[test]
    fn squeeze_off_for_volatile_closes_in_narrow_bars() {
        let bars = make_ohlc_bars(&[
            (100.0, 100.5, 99.5, 100.0),
            (150.0, 150.5, 149.5, 150.0),
            (80.0, 80.5, 79.5, 80.0),
        ]);
        let mut sq = Squeeze::new(3, 2.0, 3, 0.1, false);
        sq.next_state(&bars[0]);
        sq.next_state(&bars[1]);
        assert_eq!(sq.next_state(&bars[2]), Some(SqueezeState::Off));
    }

    #[test]
    fn momentum_lookback_and_sign() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let mut mom = SqueezeMomentum::new(5);
        let lookback = mom.lookback();
        let result = compute(&mut mom, &bars);
        assert_eq!(lookback, 8);
        assert_eq!(result.defined_from(), Some(8));
        // A steady uptrend closes above its blended midline.
        assert!(result.last().unwrap() > 0.0);
    }
}
