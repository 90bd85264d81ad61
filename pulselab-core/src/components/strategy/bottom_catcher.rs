//! Oversold capitulation entry, long-only.
//!
//! Enters when RSI is below `oversold`, RSI fell by more than `rsi_drop`
//! against the previous bar, and the entry fast SMA crosses below the entry
//! slow SMA. Exits when RSI is above `overbought` and the exit fast SMA
//! crosses above the exit slow SMA.

use crate::components::crossover::Cross;
use crate::components::indicator::{Indicator, Series};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::{Rsi, Sma};

use super::Strategy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottomCatcherParams {
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub rsi_drop: f64,
    pub entry_fast: usize,
    pub entry_slow: usize,
    pub exit_fast: usize,
    pub exit_slow: usize,
}

#[derive(Debug, Clone)]
pub struct BottomCatcher {
    params: BottomCatcherParams,
    rsi: Rsi,
    entry_fast: Sma,
    entry_slow: Sma,
    exit_fast: Sma,
    exit_slow: Sma,
    rsi_values: Series,
    entry_fast_values: Series,
    entry_slow_values: Series,
    exit_fast_values: Series,
    exit_slow_values: Series,
    name: String,
}

impl BottomCatcher {
    pub fn new(params: BottomCatcherParams) -> Self {
        Self {
            params,
            rsi: Rsi::new(params.rsi_period),
            entry_fast: Sma::new(params.entry_fast),
            entry_slow: Sma::new(params.entry_slow),
            exit_fast: Sma::new(params.exit_fast),
            exit_slow: Sma::new(params.exit_slow),
            rsi_values: Series::new(),
            entry_fast_values: Series::new(),
            entry_slow_values: Series::new(),
            exit_fast_values: Series::new(),
            exit_slow_values: Series::new(),
            name: format!("bottom_catcher_{}", params.rsi_period),
        }
    }

    fn entry_signal(&self) -> bool {
        let (Some(rsi), Some(prev_rsi)) = (self.rsi_values.ago(0), self.rsi_values.ago(1)) else {
            return false;
        };
        rsi < self.params.oversold
            && prev_rsi - rsi > self.params.rsi_drop
            && Cross::latest(&self.entry_fast_values, &self.entry_slow_values).is_below()
    }

    fn exit_signal(&self) -> bool {
        let Some(rsi) = self.rsi_values.last() else {
            return false;
        };
        rsi > self.params.overbought
            && Cross::latest(&self.exit_fast_values, &self.exit_slow_values).is_above()
    }
}

impl Strategy for BottomCatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        (self.rsi.lookback() + 1)
            .max(self.params.entry_slow)
            .max(self.params.exit_slow)
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        self.rsi_values.push(self.rsi.update(bar));
        self.entry_fast_values.push(self.entry_fast.update(bar));
        self.entry_slow_values.push(self.entry_slow.update(bar));
        self.exit_fast_values.push(self.exit_fast.update(bar));
        self.exit_slow_values.push(self.exit_slow.update(bar));
    }

    fn decide(&mut self, _bars: &BarSeries, position: &Position) -> Action {
        if position.is_flat() && self.entry_signal() {
            Action::enter_long()
        } else if position.is_long() && self.exit_signal() {
            Action::CloseLong
        } else {
            Action::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn params() -> BottomCatcherParams {
        BottomCatcherParams {
            rsi_period: 3,
            oversold: 30.0,
            overbought: 70.0,
            rsi_drop: 5.0,
            entry_fast: 2,
            entry_slow: 3,
            exit_fast: 2,
            exit_slow: 3,
        }
    }

    fn run(closes: &[f64], position: Position) -> Vec<Action> {
        let mut strategy = BottomCatcher::new(params());
        let mut series = BarSeries::new();
        let mut actions = Vec::new();
        for bar in make_bars(closes) {
            series.push(bar).unwrap();
            strategy.on_bar(&series);
            actions.push(strategy.decide(&series, &position));
        }
        actions
    }

    #[test]
    fn capitulation_after_rally_enters() {
        // RSI(3) at bar 4: changes +1, +1, -10 → gains 2/3, losses 10/3 → 16.7
        // previous RSI at bar 3 is 100 → drop 83.3; fast SMA crosses below slow.
        let actions = run(&[10.0, 11.0, 12.0, 13.0, 3.0], Position::flat());
        assert!(actions[4].is_entry());
        assert_eq!(actions.iter().filter(|a| a.is_entry()).count(), 1);
    }

    #[test]
    fn no_entry_while_long() {
        let actions = run(&[10.0, 11.0, 12.0, 13.0, 3.0], Position::long(10.0));
        assert!(actions.iter().all(|a| !a.is_entry()));
    }

    #[test]
    fn rally_after_slump_exits_long() {
        // Exit SMAs: fast (2) crosses above slow (3) at bar 4 with RSI(3) = 83.3.
        let actions = run(&[13.0, 12.0, 11.0, 10.0, 20.0], Position::long(10.0));
        assert_eq!(actions[4], Action::CloseLong);
    }
}
