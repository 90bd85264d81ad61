//! Strategy contract and the per-instance driver.
//!
//! A strategy owns its indicator instances and any explicit decision state.
//! Each bar is delivered in two steps:
//! - `on_bar` advances market state (indicators, pattern and pullback machines)
//!   from the bar history alone; it runs on every bar, warmup included
//! - `decide` applies the decision rule for the newest bar given the current
//!   position, and runs only once the instance is past its warmup
//!
//! `StrategyInstance` wraps a boxed variant together with its own bar buffer
//! and enforces the calling discipline: one `decide` per bar, in increasing
//! index order.

pub mod adaptive_t3_squeeze;
pub mod bottom_catcher;
pub mod coral_pullback;
pub mod ehlers_combo;
pub mod ema_bandpass_combo;
pub mod ema_breakout;
pub mod level_breakout;
pub mod pullback;
pub mod rsi_oscillator;
pub mod sma_cross;
pub mod sma_cross_atr;

pub use adaptive_t3_squeeze::AdaptiveT3Squeeze;
pub use bottom_catcher::BottomCatcher;
pub use coral_pullback::CoralPullback;
pub use ehlers_combo::EhlersCombo;
pub use ema_bandpass_combo::EmaBandpassCombo;
pub use ema_breakout::EmaBreakout;
pub use level_breakout::LevelBreakout;
pub use pullback::{
    PullbackMachine, PullbackMachineState, PullbackObservation, PullbackPhase,
};
pub use rsi_oscillator::RsiOscillator;
pub use sma_cross::SmaCross;
pub use sma_cross_atr::SmaCrossAtr;

use tracing::{debug, warn};

use crate::domain::{Action, Bar, BarSeries, DataError, Position};

use super::factory::StrategyKind;

/// Polymorphic decision rule over a bar history.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Bars required before `decide` may return anything but `Action::None`.
    fn warmup_bars(&self) -> usize;

    /// Consume the newest bar of `bars`. Called exactly once per bar.
    fn on_bar(&mut self, bars: &BarSeries);

    /// Action for the newest bar of `bars` given the current position.
    fn decide(&mut self, bars: &BarSeries, position: &Position) -> Action;
}

/// Long entry unless already long. Holding short means reverse.
pub(crate) fn enter_unless_long(position: &Position, action: Action) -> Action {
    if position.is_long() {
        Action::None
    } else {
        action
    }
}

/// Short entry unless already short. Holding long means reverse.
pub(crate) fn enter_unless_short(position: &Position, action: Action) -> Action {
    if position.is_short() {
        Action::None
    } else {
        action
    }
}

/// One strategy variant bound to its own bar buffer.
pub struct StrategyInstance {
    kind: StrategyKind,
    strategy: Box<dyn Strategy>,
    bars: BarSeries,
    last_decided: Option<usize>,
}

impl std::fmt::Debug for StrategyInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyInstance")
            .field("kind", &self.kind)
            .field("name", &self.strategy.name())
            .field("bars", &self.bars.len())
            .field("last_decided", &self.last_decided)
            .finish()
    }
}

impl StrategyInstance {
    pub fn new(kind: StrategyKind, strategy: Box<dyn Strategy>) -> Self {
        Self {
            kind,
            strategy,
            bars: BarSeries::new(),
            last_decided: None,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        self.strategy.name()
    }

    /// Minimum number of bars before `decide` can return anything other than `None`.
    pub fn required_warmup(&self) -> usize {
        self.strategy.warmup_bars()
    }

    pub fn bars(&self) -> &BarSeries {
        &self.bars
    }

    /// Append a bar and advance the strategy's market state. Returns its index.
    pub fn push_bar(&mut self, bar: Bar) -> Result<usize, DataError> {
        let index = self.bars.push(bar)?;
        self.strategy.on_bar(&self.bars);
        Ok(index)
    }

    /// Decide for the bar at `bar_index`, which must be the newest bar and not
    /// yet decided. Anything else is answered with `Action::None`.
    pub fn decide(&mut self, bar_index: usize, position: &Position) -> Action {
        let newest = self.bars.len().checked_sub(1);
        if newest != Some(bar_index) {
            warn!(
                strategy = self.strategy.name(),
                bar_index,
                newest = ?newest,
                "decide called for a bar that is not the newest"
            );
            return Action::None;
        }
        if self.last_decided.is_some_and(|last| bar_index <= last) {
            warn!(
                strategy = self.strategy.name(),
                bar_index, "decide called twice for the same bar"
            );
            return Action::None;
        }
        self.last_decided = Some(bar_index);

        if bar_index < self.strategy.warmup_bars() {
            return Action::None;
        }

        let action = self.strategy.decide(&self.bars, position);
        if !action.is_none() {
            debug!(
                strategy = self.strategy.name(),
                bar_index,
                %action,
                "strategy action"
            );
        }
        action
    }

    /// `push_bar` followed by `decide` for that bar.
    pub fn step(&mut self, bar: Bar, position: &Position) -> Result<Action, DataError> {
        let index = self.push_bar(bar)?;
        Ok(self.decide(index, position))
    }
}
