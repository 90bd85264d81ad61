//! EMA breakout, long-only or bidirectional.
//!
//! Entry when the close crosses the EMA. The stop sits at an ATR offset from
//! the breakout bar's low (long) or high (short), or at the N-bar structural
//! extreme when `swing_lookback > 0`. The target is the stop distance times
//! the reward ratio.
//!
//! The bidirectional variant also takes short entries, and an opposite cross
//! closes the open side instead of reversing it. The long-only variant leaves
//! exits to the protective levels.

use crate::components::crossover::Cross;
use crate::components::indicator::{Indicator, Series};
use crate::components::risk::{OrderIntent, TradeSide};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::{Atr, Ema};

use super::Strategy;

#[derive(Debug, Clone)]
pub struct EmaBreakout {
    ema: Ema,
    atr: Atr,
    atr_multiplier: f64,
    reward_ratio: f64,
    swing_lookback: usize,
    bidirectional: bool,
    closes: Series,
    ema_values: Series,
    atr_values: Series,
    name: String,
}

impl EmaBreakout {
    pub fn new(
        ema_period: usize,
        atr_period: usize,
        atr_multiplier: f64,
        reward_ratio: f64,
        swing_lookback: usize,
        bidirectional: bool,
    ) -> Self {
        let prefix = if bidirectional {
            "ema_breakout_bidirectional"
        } else {
            "ema_breakout"
        };
        Self {
            ema: Ema::new(ema_period),
            atr: Atr::new(atr_period),
            atr_multiplier,
            reward_ratio,
            swing_lookback,
            bidirectional,
            closes: Series::new(),
            ema_values: Series::new(),
            atr_values: Series::new(),
            name: format!("{prefix}_{ema_period}_{atr_period}"),
        }
    }

    fn intent(&self, side: TradeSide, bars: &BarSeries) -> Option<OrderIntent> {
        let bar = bars.last()?;
        let stop = if self.swing_lookback == 0 {
            let offset = self.atr_values.last()? * self.atr_multiplier;
            match side {
                TradeSide::Long => bar.low - offset,
                TradeSide::Short => bar.high + offset,
            }
        } else {
            match side {
                TradeSide::Long => bars.lowest_low(self.swing_lookback)?,
                TradeSide::Short => bars.highest_high(self.swing_lookback)?,
            }
        };
        OrderIntent::from_stop_with_reward(side, bar.close, stop, self.reward_ratio)
    }

    fn entry(&self, side: TradeSide, bars: &BarSeries) -> Action {
        self.intent(side, bars)
            .map_or(Action::None, OrderIntent::into_action)
    }
}

impl Strategy for EmaBreakout {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        self.ema
            .period()
            .max(self.atr.lookback())
            .max(self.swing_lookback)
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        self.closes.push(Some(bar.close));
        self.ema_values.push(self.ema.update(bar));
        self.atr_values.push(self.atr.update(bar));
    }

    fn decide(&mut self, bars: &BarSeries, position: &Position) -> Action {
        let cross = Cross::latest(&self.closes, &self.ema_values);
        if self.bidirectional {
            match cross {
                Cross::Above if position.is_short() => Action::CloseShort,
                Cross::Above if position.is_flat() => self.entry(TradeSide::Long, bars),
                Cross::Below if position.is_long() => Action::CloseLong,
                Cross::Below if position.is_flat() => self.entry(TradeSide::Short, bars),
                _ => Action::None,
            }
        } else {
            match cross {
                Cross::Above if !position.is_long() => self.entry(TradeSide::Long, bars),
                _ => Action::None,
            }
        }
    }
}
