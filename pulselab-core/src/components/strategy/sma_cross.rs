//! Moving average crossover, long-only.
//!
//! Enters long when the fast SMA crosses above the slow SMA and closes the
//! long when the slow SMA crosses back above the fast one.

use crate::components::crossover::Cross;
use crate::components::indicator::{Indicator, Series};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::Sma;

use super::{enter_unless_long, Strategy};

#[derive(Debug, Clone)]
pub struct SmaCross {
    fast: Sma,
    slow: Sma,
    fast_values: Series,
    slow_values: Series,
    name: String,
}

impl SmaCross {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        assert!(
            slow_period > fast_period,
            "slow_period must be > fast_period"
        );
        Self {
            fast: Sma::new(fast_period),
            slow: Sma::new(slow_period),
            fast_values: Series::new(),
            slow_values: Series::new(),
            name: format!("sma_cross_{fast_period}_{slow_period}"),
        }
    }

    pub fn fast_values(&self) -> &Series {
        &self.fast_values
    }

    pub fn slow_values(&self) -> &Series {
        &self.slow_values
    }
}

impl Strategy for SmaCross {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        self.slow.period()
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        self.fast_values.push(self.fast.update(bar));
        self.slow_values.push(self.slow.update(bar));
    }

    fn decide(&mut self, _bars: &BarSeries, position: &Position) -> Action {
        match Cross::latest(&self.fast_values, &self.slow_values) {
            Cross::Above => enter_unless_long(position, Action::enter_long()),
            Cross::Below if position.is_long() => Action::CloseLong,
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn run(closes: &[f64]) -> Vec<Action> {
        let mut strategy = SmaCross::new(2, 3);
        let mut series = BarSeries::new();
        let mut position = Position::flat();
        let mut actions = Vec::new();
        for bar in make_bars(closes) {
            let close = bar.close;
            series.push(bar).unwrap();
            strategy.on_bar(&series);
            let action = strategy.decide(&series, &position);
            match action {
                Action::EnterLong { .. } => position = Position::long(close),
                Action::CloseLong => position = Position::flat(),
                _ => {}
            }
            actions.push(action);
        }
        actions
    }

    #[test]
    fn enters_on_golden_cross_and_exits_on_death_cross() {
        // fast (2): -, 2.5, 1.5, 5.5, 9.5, 8.5
        // slow (3): -, -,   2.0, 4.33, 6.33, 9.0
        let actions = run(&[3.0, 2.0, 1.0, 10.0, 9.0, 8.0, 1.0, 1.0, 1.0]);
        assert!(actions[3].is_entry());
        assert_eq!(actions[5], Action::CloseLong);
        assert_eq!(actions.iter().filter(|a| !a.is_none()).count(), 2);
    }

    #[test]
    fn death_cross_while_flat_is_ignored() {
        // First exceed at bar 2 has no defined previous slow value, so no entry;
        // the cross below at bar 5 finds no position to close.
        let actions = run(&[1.0, 2.0, 3.0, 10.0, 9.0, 8.0, 1.0, 1.0, 1.0]);
        assert!(actions.iter().all(Action::is_none));
    }

    #[test]
    #[should_panic(expected = "slow_period must be > fast_period")]
    fn rejects_inverted_periods() {
        SmaCross::new(5, 5);
    }
}
