//! EMA trend + bandpass agreement.
//!
//! Two ±1/0 votes per bar:
//! - EMA: sign of fast EMA - slow EMA
//! - bandpass: +1 above `zone`, -1 below `-zone`, unchanged inside the zone
//!   (starts at 0)
//!
//! The combined signal is the shared vote when both agree and are non-zero,
//! otherwise 0, optionally inverted. +1 targets long, -1 short, 0 flat.

use crate::components::indicator::{Indicator, Series};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::{Bandpass, Ema};

use super::{enter_unless_long, enter_unless_short, Strategy};

#[derive(Debug, Clone)]
pub struct EmaBandpassCombo {
    fast: Ema,
    slow: Ema,
    bandpass: Bandpass,
    zone: f64,
    invert: bool,
    bandpass_vote: i8,
    signals: Series,
    name: String,
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

impl EmaBandpassCombo {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        bp_period: usize,
        bp_delta: f64,
        bp_zone: f64,
        invert: bool,
    ) -> Self {
        assert!(
            slow_period > fast_period,
            "slow_period must be > fast_period"
        );
        Self {
            fast: Ema::new(fast_period),
            slow: Ema::new(slow_period),
            bandpass: Bandpass::new(bp_period, bp_delta),
            zone: bp_zone.abs(),
            invert,
            bandpass_vote: 0,
            signals: Series::new(),
            name: format!("ema_bandpass_combo_{fast_period}_{slow_period}_{bp_period}"),
        }
    }

    /// Combined signal history (+1, -1, 0; undefined while the bandpass warms up).
    pub fn signals(&self) -> &Series {
        &self.signals
    }
}

impl Strategy for EmaBandpassCombo {
    fn name(&self) -> &str {
        &self.name
    }

    /// One full period for the slowest component. Both EMAs are seeded at the
    /// first close and the bandpass recurrence starts from zero taps, so their
    /// first values are start-up transients rather than votes.
    fn warmup_bars(&self) -> usize {
        self.slow.period().max(self.bandpass.period())
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        let fast = self.fast.update(bar);
        let slow = self.slow.update(bar);
        let bp = self.bandpass.update(bar);

        let (Some(fast), Some(slow), Some(bp)) = (fast, slow, bp) else {
            self.signals.push(None);
            return;
        };

        if bp > self.zone {
            self.bandpass_vote = 1;
        } else if bp < -self.zone {
            self.bandpass_vote = -1;
        }
        let ema_vote = sign(fast - slow);
        let mut combined = if ema_vote != 0 && ema_vote == self.bandpass_vote {
            ema_vote
        } else {
            0
        };
        if self.invert {
            combined = -combined;
        }
        self.signals.push(Some(f64::from(combined)));
    }

    fn decide(&mut self, _bars: &BarSeries, position: &Position) -> Action {
        let Some(signal) = self.signals.last() else {
            return Action::None;
        };
        match sign(signal) {
            1 => enter_unless_long(position, Action::enter_long()),
            -1 => enter_unless_short(position, Action::enter_short()),
            _ if !position.is_flat() => Action::CloseAny,
            _ => Action::None,
        }
    }
}
