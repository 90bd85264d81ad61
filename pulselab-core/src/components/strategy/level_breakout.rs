//! Armed buy-stop above a failed-rally bar, long-only.
//!
//! Pattern at bar i: close[i] < low[i-1] and high[i-1] < high[i-N].
//! The pattern arms a buy-stop at high[i] with its stop at low[i]. A later
//! bar whose high reaches the level triggers an entry at the level, targeting
//! `target_pct` percent above it. The armed level is cleared once it triggers
//! or once an open position is closed; a newer pattern re-arms.
//! The trigger check runs before pattern detection on each bar.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::risk::{OrderIntent, TradeSide};
use crate::domain::{Action, BarSeries, Position};

use super::Strategy;

/// Pending buy-stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmedLevel {
    pub level: f64,
    pub stop_loss: f64,
    pub armed_at: usize,
}

#[derive(Debug, Clone)]
pub struct LevelBreakout {
    lookback: usize,
    target_pct: f64,
    armed: Option<ArmedLevel>,
    triggered: Option<OrderIntent>,
    was_in_position: bool,
    name: String,
}

impl LevelBreakout {
    pub fn new(lookback: usize, target_pct: f64) -> Self {
        assert!(lookback >= 2, "lookback must be >= 2");
        Self {
            lookback,
            target_pct,
            armed: None,
            triggered: None,
            was_in_position: false,
            name: format!("level_breakout_{lookback}_{target_pct}"),
        }
    }

    pub fn armed(&self) -> Option<ArmedLevel> {
        self.armed
    }

    fn pattern(&self, bars: &BarSeries) -> Option<ArmedLevel> {
        let bar = bars.ago(0)?;
        let prev = bars.ago(1)?;
        let earlier = bars.ago(self.lookback)?;
        (bar.close < prev.low && prev.high < earlier.high).then(|| ArmedLevel {
            level: bar.high,
            stop_loss: bar.low,
            armed_at: bars.len() - 1,
        })
    }
}

impl Strategy for LevelBreakout {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        self.lookback
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        let index = bars.len() - 1;

        self.triggered = None;
        if let Some(armed) = self.armed {
            if armed.armed_at < index && bar.high >= armed.level {
                self.triggered = OrderIntent::from_stop_with_percent_target(
                    TradeSide::Long,
                    armed.level,
                    armed.stop_loss,
                    self.target_pct,
                );
                self.armed = None;
            }
        }

        if let Some(armed) = self.pattern(bars) {
            debug!(level = armed.level, stop = armed.stop_loss, index, "level armed");
            self.armed = Some(armed);
        }
    }

    fn decide(&mut self, bars: &BarSeries, position: &Position) -> Action {
        // A level armed on the closing bar itself is a fresh setup and survives.
        if self.was_in_position && position.is_flat() {
            let newest = bars.len().saturating_sub(1);
            if self.armed.is_some_and(|a| a.armed_at < newest) {
                debug!(index = newest, "armed level cleared after position closed");
                self.armed = None;
            }
        }
        self.was_in_position = !position.is_flat();

        match self.triggered.take() {
            Some(intent) if position.is_flat() => intent.into_action(),
            _ => Action::None,
        }
    }
}
