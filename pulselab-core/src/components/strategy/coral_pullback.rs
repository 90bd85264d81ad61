//! Coral Trend pullback entries.
//!
//! The Coral line and its direction feed a [`PullbackMachine`]. When the
//! machine completes a pullback the strategy enters on the close, with the
//! stop at the swing extreme of the last `swing_lookback` bars and the target
//! at `reward_ratio` times the stop distance.

use crate::components::risk::{OrderIntent, TradeSide};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::{CoralPoint, CoralTrend};

use super::{enter_unless_long, enter_unless_short, PullbackMachine, PullbackObservation, Strategy};

#[derive(Debug, Clone)]
pub struct CoralPullback {
    coral: CoralTrend,
    machine: PullbackMachine,
    swing_lookback: usize,
    reward_ratio: f64,
    prev: Option<(CoralPoint, f64)>,
    pending: Option<OrderIntent>,
    name: String,
}

impl CoralPullback {
    pub fn new(smoothing: usize, cd: f64, swing_lookback: usize, reward_ratio: f64) -> Self {
        assert!(swing_lookback >= 1, "swing_lookback must be >= 1");
        Self {
            coral: CoralTrend::new(smoothing, cd),
            machine: PullbackMachine::new(),
            swing_lookback,
            reward_ratio,
            prev: None,
            pending: None,
            name: format!("coral_pullback_{smoothing}_{cd}_{swing_lookback}"),
        }
    }

    pub fn machine(&self) -> &PullbackMachine {
        &self.machine
    }

    fn intent(&self, side: TradeSide, bars: &BarSeries) -> Option<OrderIntent> {
        let entry = bars.last()?.close;
        let stop = match side {
            TradeSide::Long => bars.lowest_low(self.swing_lookback)?,
            TradeSide::Short => bars.highest_high(self.swing_lookback)?,
        };
        OrderIntent::from_stop_with_reward(side, entry, stop, self.reward_ratio)
    }
}

impl Strategy for CoralPullback {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        self.coral.smoothing().max(self.swing_lookback)
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        let point = self.coral.next_point(bar.close);
        let obs = PullbackObservation {
            trend: point.direction,
            prev_trend: self.prev.map_or(0, |(p, _)| p.direction),
            high: bar.high,
            low: bar.low,
            close: bar.close,
            line: point.line,
            prev_close: self.prev.map(|(_, close)| close),
            prev_line: self.prev.map(|(p, _)| p.line),
        };
        self.prev = Some((point, bar.close));

        self.pending = self
            .machine
            .step(&obs)
            .and_then(|side| self.intent(side, bars));
    }

    fn decide(&mut self, _bars: &BarSeries, position: &Position) -> Action {
        match self.pending.take() {
            Some(intent) => {
                let action = intent.into_action();
                match intent.side {
                    TradeSide::Long => enter_unless_long(position, action),
                    TradeSide::Short => enter_unless_short(position, action),
                }
            }
            None => Action::None,
        }
    }
}
