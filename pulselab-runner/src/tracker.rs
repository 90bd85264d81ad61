//! Minimal position oracle for replays.
//!
//! Tracks direction, entry and protective levels, nothing else. Entries and
//! exits fill at the close of the bar that emitted them. Before each new bar
//! is decided, an open position is flattened if that bar's range touches its
//! stop or target. When both are touched on the same bar the stop wins.

use pulselab_core::domain::{Action, Bar, Direction, Position};
use serde::{Deserialize, Serialize};

/// Why a position was closed by its protective levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectiveExit {
    StopLoss,
    TakeProfit,
}

#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    position: Position,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn direction(&self) -> Direction {
        self.position.direction
    }

    /// Flatten if `bar` reaches the open position's stop or target.
    pub fn check_levels(&mut self, bar: &Bar) -> Option<ProtectiveExit> {
        let exit = match self.position.direction {
            Direction::Flat => None,
            Direction::Long => {
                if self.position.stop_loss.is_some_and(|sl| bar.low <= sl) {
                    Some(ProtectiveExit::StopLoss)
                } else if self.position.take_profit.is_some_and(|tp| bar.high >= tp) {
                    Some(ProtectiveExit::TakeProfit)
                } else {
                    None
                }
            }
            Direction::Short => {
                if self.position.stop_loss.is_some_and(|sl| bar.high >= sl) {
                    Some(ProtectiveExit::StopLoss)
                } else if self.position.take_profit.is_some_and(|tp| bar.low <= tp) {
                    Some(ProtectiveExit::TakeProfit)
                } else {
                    None
                }
            }
        };
        if exit.is_some() {
            self.position = Position::flat();
        }
        exit
    }

    /// Apply the action emitted for `bar`.
    ///
    /// Entries always fill at `bar.close`, including stop-triggered entries
    /// whose trigger level lies inside the bar. `Action` carries protective
    /// levels only, never an entry price.
    pub fn apply(&mut self, action: &Action, bar: &Bar) {
        self.position = match *action {
            Action::EnterLong {
                stop_loss,
                take_profit,
            } => Position::long(bar.close).with_levels(stop_loss, take_profit),
            Action::EnterShort {
                stop_loss,
                take_profit,
            } => Position::short(bar.close).with_levels(stop_loss, take_profit),
            Action::CloseLong if self.position.is_long() => Position::flat(),
            Action::CloseShort if self.position.is_short() => Position::flat(),
            Action::CloseAny => Position::flat(),
            _ => self.position,
        };
    }
}
