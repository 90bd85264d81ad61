//! Pullback state machine for trend-line pullback entries.
//!
//! ```text
//! Idle ──bar fully beyond line──▶ TrendConfirmed ──close back across line──▶ PullbackActive
//!   ▲                                                                          │ trend unchanged
//!   └──── fired / invalidated ◀── PullbackValid ◀─────────────────────────────┘
//! ```
//!
//! - Any bar whose trend direction reverses against the previous bar resets
//!   to Idle and ends processing for that bar.
//! - PullbackActive moves on to PullbackValid on the next bar if the trend
//!   still matches the recorded sign, and that same bar is then checked for
//!   the re-cross.
//! - A violated precondition returns to Idle; phases are never skipped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::risk::TradeSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullbackPhase {
    #[default]
    Idle,
    TrendConfirmed,
    PullbackActive,
    PullbackValid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PullbackMachineState {
    pub phase: PullbackPhase,
    /// Trend sign recorded when the pullback began, 0 outside a pullback.
    pub trend_sign_at_pullback_start: i8,
    /// Trend sign that confirmed the trend, 0 while idle.
    pub confirmed_trend: i8,
}

/// Everything the machine looks at for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullbackObservation {
    pub trend: i8,
    pub prev_trend: i8,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub line: f64,
    pub prev_close: Option<f64>,
    pub prev_line: Option<f64>,
}

impl PullbackObservation {
    /// Whole bar strictly beyond the line on the `sign` side.
    fn bar_beyond_line(&self, sign: i8) -> bool {
        match sign {
            1 => self.low > self.line,
            -1 => self.high < self.line,
            _ => false,
        }
    }

    /// Close moved from the `sign` side of the line (or on it) to the other side.
    fn close_crossed_against(&self, sign: i8) -> bool {
        let (Some(prev_close), Some(prev_line)) = (self.prev_close, self.prev_line) else {
            return false;
        };
        match sign {
            1 => prev_close >= prev_line && self.close < self.line,
            -1 => prev_close <= prev_line && self.close > self.line,
            _ => false,
        }
    }

    /// Close moved back to the `sign` side of the line.
    fn close_crossed_with(&self, sign: i8) -> bool {
        self.close_crossed_against(-sign)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PullbackMachine {
    state: PullbackMachineState,
}

impl PullbackMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PullbackMachineState {
        self.state
    }

    pub fn phase(&self) -> PullbackPhase {
        self.state.phase
    }

    fn reset(&mut self, reason: &'static str) {
        if self.state.phase != PullbackPhase::Idle {
            debug!(from = ?self.state.phase, reason, "pullback machine reset");
        }
        self.state = PullbackMachineState::default();
    }

    fn enter(&mut self, phase: PullbackPhase) {
        debug!(from = ?self.state.phase, to = ?phase, "pullback transition");
        self.state.phase = phase;
    }

    /// Advance one bar. Returns the side to enter when the pullback completes.
    pub fn step(&mut self, obs: &PullbackObservation) -> Option<TradeSide> {
        if obs.prev_trend != 0 && obs.trend != 0 && obs.trend != obs.prev_trend {
            self.reset("trend reversal");
            return None;
        }

        match self.state.phase {
            PullbackPhase::Idle => {
                if obs.trend != 0 && obs.bar_beyond_line(obs.trend) {
                    self.state.confirmed_trend = obs.trend;
                    self.enter(PullbackPhase::TrendConfirmed);
                }
                None
            }
            PullbackPhase::TrendConfirmed => {
                let trend = self.state.confirmed_trend;
                if obs.trend != trend {
                    self.reset("trend changed before pullback");
                } else if obs.close_crossed_against(trend) {
                    self.state.trend_sign_at_pullback_start = trend;
                    self.enter(PullbackPhase::PullbackActive);
                }
                None
            }
            PullbackPhase::PullbackActive => {
                if obs.trend != self.state.trend_sign_at_pullback_start {
                    self.reset("trend flipped during pullback");
                    return None;
                }
                self.enter(PullbackPhase::PullbackValid);
                self.check_valid(obs)
            }
            PullbackPhase::PullbackValid => self.check_valid(obs),
        }
    }

    fn check_valid(&mut self, obs: &PullbackObservation) -> Option<TradeSide> {
        let sign = self.state.trend_sign_at_pullback_start;
        if obs.trend != sign {
            self.reset("trend flipped during pullback");
            return None;
        }
        if obs.close_crossed_with(sign) {
            let side = TradeSide::from_sign(sign);
            debug!(?side, "pullback complete");
            self.reset("entered");
            return side;
        }
        None
    }
}
