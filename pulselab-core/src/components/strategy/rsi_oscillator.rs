//! RSI oscillator, long-only mean reversion.
//!
//! Buys when RSI drops below the lower bound while flat, closes the long when
//! RSI rises above the upper bound.

use crate::components::indicator::{Indicator, Series};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::Rsi;

use super::Strategy;

#[derive(Debug, Clone)]
pub struct RsiOscillator {
    rsi: Rsi,
    lower_bound: f64,
    upper_bound: f64,
    values: Series,
    name: String,
}

impl RsiOscillator {
    pub fn new(rsi_period: usize, lower_bound: f64, upper_bound: f64) -> Self {
        assert!(
            lower_bound < upper_bound,
            "lower_bound must be < upper_bound"
        );
        Self {
            rsi: Rsi::new(rsi_period),
            lower_bound,
            upper_bound,
            values: Series::new(),
            name: format!("rsi_oscillator_{rsi_period}_{lower_bound}_{upper_bound}"),
        }
    }
}

impl Strategy for RsiOscillator {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        self.rsi.lookback()
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        self.values.push(self.rsi.update(bar));
    }

    fn decide(&mut self, _bars: &BarSeries, position: &Position) -> Action {
        let Some(rsi) = self.values.last() else {
            return Action::None;
        };
        if rsi < self.lower_bound {
            if position.is_flat() {
                return Action::enter_long();
            }
        } else if rsi > self.upper_bound && position.is_long() {
            return Action::CloseLong;
        }
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn feed(strategy: &mut RsiOscillator, closes: &[f64]) -> BarSeries {
        let mut series = BarSeries::new();
        for bar in make_bars(closes) {
            series.push(bar).unwrap();
            strategy.on_bar(&series);
        }
        series
    }

    #[test]
    fn oversold_enters_only_when_flat() {
        let mut strategy = RsiOscillator::new(3, 30.0, 70.0);
        let series = feed(&mut strategy, &[10.0, 9.0, 8.0, 7.0]);
        assert!(strategy.decide(&series, &Position::flat()).is_entry());
        assert_eq!(strategy.decide(&series, &Position::long(7.0)), Action::None);
    }

    #[test]
    fn overbought_closes_long() {
        let mut strategy = RsiOscillator::new(3, 30.0, 70.0);
        let series = feed(&mut strategy, &[7.0, 8.0, 9.0, 10.0]);
        assert_eq!(
            strategy.decide(&series, &Position::long(7.0)),
            Action::CloseLong
        );
        assert_eq!(strategy.decide(&series, &Position::flat()), Action::None);
    }

    #[test]
    fn undefined_rsi_is_no_signal() {
        let mut strategy = RsiOscillator::new(14, 30.0, 70.0);
        let series = feed(&mut strategy, &[10.0, 9.0, 8.0]);
        assert_eq!(strategy.decide(&series, &Position::flat()), Action::None);
    }
}
