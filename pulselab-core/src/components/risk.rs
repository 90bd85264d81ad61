//! Risk / order-intent calculator.
//!
//! Turns a raw entry signal plus indicator values into an entry price,
//! stop-loss and take-profit triple. Every constructor returns `None` when the
//! stop is on the wrong side of entry, the risk distance is zero, or any value
//! is non-finite. Callers treat that as "no trade" for the bar.

use serde::{Deserialize, Serialize};

use crate::domain::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            TradeSide::Long => 1.0,
            TradeSide::Short => -1.0,
        }
    }

    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign.signum() {
            1 => Some(TradeSide::Long),
            -1 => Some(TradeSide::Short),
            _ => None,
        }
    }
}

/// Proposed entry with protective levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub side: TradeSide,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: Option<f64>,
}

impl OrderIntent {
    /// Stop and target at ATR multiples from entry.
    ///
    /// Long: stop = entry - atr·sl_mult, target = entry + atr·tp_mult.
    pub fn from_atr(
        side: TradeSide,
        entry_price: f64,
        atr: f64,
        sl_multiplier: f64,
        tp_multiplier: f64,
    ) -> Option<Self> {
        if !(atr.is_finite() && atr > 0.0) {
            return None;
        }
        let s = side.sign();
        Self::checked(
            side,
            entry_price,
            entry_price - s * atr * sl_multiplier,
            Some(entry_price + s * atr * tp_multiplier),
        )
    }

    /// Target at `reward_ratio` times the stop distance beyond entry.
    pub fn from_stop_with_reward(
        side: TradeSide,
        entry_price: f64,
        stop_loss: f64,
        reward_ratio: f64,
    ) -> Option<Self> {
        let risk = (entry_price - stop_loss).abs();
        let target = entry_price + side.sign() * risk * reward_ratio;
        Self::checked(side, entry_price, stop_loss, Some(target))
    }

    /// Target at a fixed percentage beyond entry (`3.0` means 3%).
    pub fn from_stop_with_percent_target(
        side: TradeSide,
        entry_price: f64,
        stop_loss: f64,
        target_pct: f64,
    ) -> Option<Self> {
        let target = entry_price * (1.0 + side.sign() * target_pct / 100.0);
        Self::checked(side, entry_price, stop_loss, Some(target))
    }

    fn checked(
        side: TradeSide,
        entry_price: f64,
        stop_loss: f64,
        take_profit: Option<f64>,
    ) -> Option<Self> {
        let finite = entry_price.is_finite()
            && stop_loss.is_finite()
            && take_profit.map_or(true, f64::is_finite);
        if !finite {
            return None;
        }
        let stop_ok = match side {
            TradeSide::Long => stop_loss < entry_price,
            TradeSide::Short => stop_loss > entry_price,
        };
        let target_ok = match (side, take_profit) {
            (_, None) => true,
            (TradeSide::Long, Some(tp)) => tp > entry_price,
            (TradeSide::Short, Some(tp)) => tp < entry_price,
        };
        if !(stop_ok && target_ok) {
            tracing::warn!(
                ?side,
                entry_price,
                stop_loss,
                ?take_profit,
                "rejected protective levels"
            );
            return None;
        }
        Some(Self {
            side,
            entry_price,
            stop_loss,
            take_profit,
        })
    }

    /// Distance from entry to stop.
    pub fn risk(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }

    pub fn into_action(self) -> Action {
        match self.side {
            TradeSide::Long => Action::EnterLong {
                stop_loss: Some(self.stop_loss),
                take_profit: self.take_profit,
            },
            TradeSide::Short => Action::EnterShort {
                stop_loss: Some(self.stop_loss),
                take_profit: self.take_profit,
            },
        }
    }
}
