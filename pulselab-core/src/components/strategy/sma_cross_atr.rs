//! Moving average crossover with ATR protective levels.
//!
//! Same entry as `SmaCross`, with stop = close - ATR·sl_multiplier and
//! target = close + ATR·tp_multiplier attached at entry. The reverse cross
//! closes the long if the protective levels have not already done so.

use crate::components::crossover::Cross;
use crate::components::indicator::{Indicator, Series};
use crate::components::risk::{OrderIntent, TradeSide};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::{Atr, Sma};

use super::{enter_unless_long, Strategy};

#[derive(Debug, Clone)]
pub struct SmaCrossAtr {
    fast: Sma,
    slow: Sma,
    atr: Atr,
    sl_multiplier: f64,
    tp_multiplier: f64,
    fast_values: Series,
    slow_values: Series,
    atr_values: Series,
    name: String,
}

impl SmaCrossAtr {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        atr_period: usize,
        sl_multiplier: f64,
        tp_multiplier: f64,
    ) -> Self {
        assert!(
            slow_period > fast_period,
            "slow_period must be > fast_period"
        );
        Self {
            fast: Sma::new(fast_period),
            slow: Sma::new(slow_period),
            atr: Atr::new(atr_period),
            sl_multiplier,
            tp_multiplier,
            fast_values: Series::new(),
            slow_values: Series::new(),
            atr_values: Series::new(),
            name: format!("sma_cross_atr_{fast_period}_{slow_period}_{atr_period}"),
        }
    }
}

impl Strategy for SmaCrossAtr {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        self.slow.period().max(self.atr.lookback())
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        self.fast_values.push(self.fast.update(bar));
        self.slow_values.push(self.slow.update(bar));
        self.atr_values.push(self.atr.update(bar));
    }

    fn decide(&mut self, bars: &BarSeries, position: &Position) -> Action {
        match Cross::latest(&self.fast_values, &self.slow_values) {
            Cross::Above => {
                let (Some(bar), Some(atr)) = (bars.last(), self.atr_values.last()) else {
                    return Action::None;
                };
                OrderIntent::from_atr(
                    TradeSide::Long,
                    bar.close,
                    atr,
                    self.sl_multiplier,
                    self.tp_multiplier,
                )
                .map_or(Action::None, |intent| {
                    enter_unless_long(position, intent.into_action())
                })
            }
            Cross::Below if position.is_long() => Action::CloseLong,
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn entry_carries_atr_levels() {
        let mut strategy = SmaCrossAtr::new(2, 3, 2, 2.0, 3.0);
        let mut series = BarSeries::new();
        let mut last = Action::None;
        for bar in make_bars(&[3.0, 2.0, 1.0, 10.0]) {
            series.push(bar).unwrap();
            strategy.on_bar(&series);
            last = strategy.decide(&series, &Position::flat());
        }
        // TR over bars 2 and 3: 3.0 and 11.0 → ATR(2) = 7.0
        let Action::EnterLong {
            stop_loss: Some(sl),
            take_profit: Some(tp),
        } = last
        else {
            panic!("expected entry with levels, got {last:?}");
        };
        assert_approx(sl, 10.0 - 14.0, 1e-9);
        assert_approx(tp, 10.0 + 21.0, 1e-9);
    }

    #[test]
    fn undefined_atr_blocks_entry() {
        let mut strategy = SmaCrossAtr::new(2, 3, 10, 2.0, 3.0);
        let mut series = BarSeries::new();
        for bar in make_bars(&[3.0, 2.0, 1.0, 10.0]) {
            series.push(bar).unwrap();
            strategy.on_bar(&series);
        }
        assert_eq!(strategy.decide(&series, &Position::flat()), Action::None);
    }
}
