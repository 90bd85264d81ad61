//! Adaptive T3 slope flip gated by squeeze release and momentum.
//!
//! Long when the T3 slope turns positive (now > 0, previous <= 0), squeeze
//! momentum is positive and the squeeze has just released (off now, not off
//! on the previous bar). Short mirrors. Either side reverses an open position.

use crate::components::indicator::{Indicator, Series};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::{AdaptiveT3, Squeeze, SqueezeMomentum, SqueezeState};

use super::{enter_unless_long, enter_unless_short, Strategy};

/// Construction parameters for [`AdaptiveT3Squeeze`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveT3SqueezeParams {
    pub rsi_period: usize,
    pub t3_min_length: usize,
    pub t3_max_length: usize,
    pub volume_factor: f64,
    pub bb_length: usize,
    pub bb_mult: f64,
    pub kc_length: usize,
    pub kc_mult: f64,
    pub use_true_range: bool,
    pub momentum_length: usize,
}

#[derive(Debug, Clone)]
pub struct AdaptiveT3Squeeze {
    t3: AdaptiveT3,
    squeeze: Squeeze,
    momentum: SqueezeMomentum,
    t3_values: Series,
    momentum_values: Series,
    squeeze_now: Option<SqueezeState>,
    squeeze_prev: Option<SqueezeState>,
    name: String,
}

impl AdaptiveT3Squeeze {
    pub fn new(p: AdaptiveT3SqueezeParams) -> Self {
        Self {
            t3: AdaptiveT3::new(p.rsi_period, p.t3_min_length, p.t3_max_length, p.volume_factor),
            squeeze: Squeeze::new(p.bb_length, p.bb_mult, p.kc_length, p.kc_mult, p.use_true_range),
            momentum: SqueezeMomentum::new(p.momentum_length),
            t3_values: Series::new(),
            momentum_values: Series::new(),
            squeeze_now: None,
            squeeze_prev: None,
            name: format!(
                "adaptive_t3_squeeze_{}_{}_{}",
                p.rsi_period, p.t3_min_length, p.t3_max_length
            ),
        }
    }

    /// Slopes of the T3 line on the newest and the previous bar.
    fn slopes(&self) -> Option<(f64, f64)> {
        let t0 = self.t3_values.ago(0)?;
        let t1 = self.t3_values.ago(1)?;
        let t2 = self.t3_values.ago(2)?;
        Some((t0 - t1, t1 - t2))
    }

    fn just_released(&self) -> bool {
        matches!(
            (self.squeeze_now, self.squeeze_prev),
            (Some(SqueezeState::Off), Some(prev)) if prev != SqueezeState::Off
        )
    }
}

impl Strategy for AdaptiveT3Squeeze {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        (self.t3.lookback() + 2)
            .max(self.squeeze.lookback() + 1)
            .max(self.momentum.lookback())
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        self.t3_values.push(self.t3.update(bar));
        self.momentum_values.push(self.momentum.update(bar));
        self.squeeze_prev = self.squeeze_now;
        self.squeeze_now = self.squeeze.next_state(bar);
    }

    fn decide(&mut self, _bars: &BarSeries, position: &Position) -> Action {
        let (Some((slope, prev_slope)), Some(momentum)) =
            (self.slopes(), self.momentum_values.last())
        else {
            return Action::None;
        };
        if !self.just_released() {
            return Action::None;
        }
        if slope > 0.0 && prev_slope <= 0.0 && momentum > 0.0 {
            enter_unless_long(position, Action::enter_long())
        } else if slope < 0.0 && prev_slope >= 0.0 && momentum < 0.0 {
            enter_unless_short(position, Action::enter_short())
        } else {
            Action::None
        }
    }
}
