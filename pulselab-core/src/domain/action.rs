//! Action: the single per-bar output of a strategy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading decision for one bar.
///
/// Produced fresh on every bar and never persisted by the core. An entry in
/// the opposite direction of an open position means "reverse": the execution
/// engine closes the open side before opening the new one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    #[default]
    None,
    EnterLong {
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    },
    EnterShort {
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    },
    CloseLong,
    CloseShort,
    CloseAny,
}

impl Action {
    /// Long entry with no protective levels.
    pub fn enter_long() -> Self {
        Action::EnterLong {
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Short entry with no protective levels.
    pub fn enter_short() -> Self {
        Action::EnterShort {
            stop_loss: None,
            take_profit: None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Action::None)
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, Action::EnterLong { .. } | Action::EnterShort { .. })
    }

    pub fn is_exit(&self) -> bool {
        matches!(
            self,
            Action::CloseLong | Action::CloseShort | Action::CloseAny
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn level(v: &Option<f64>) -> String {
            v.map_or_else(|| "-".to_string(), |x| format!("{x:.4}"))
        }
        match self {
            Action::None => write!(f, "none"),
            Action::EnterLong {
                stop_loss,
                take_profit,
            } => write!(
                f,
                "enter_long(sl={}, tp={})",
                level(stop_loss),
                level(take_profit)
            ),
            Action::EnterShort {
                stop_loss,
                take_profit,
            } => write!(
                f,
                "enter_short(sl={}, tp={})",
                level(stop_loss),
                level(take_profit)
            ),
            Action::CloseLong => write!(f, "close_long"),
            Action::CloseShort => write!(f, "close_short"),
            Action::CloseAny => write!(f, "close_any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Action::None.is_none());
        assert!(Action::enter_long().is_entry());
        assert!(Action::enter_short().is_entry());
        assert!(Action::CloseAny.is_exit());
        assert!(!Action::CloseLong.is_entry());
        assert!(!Action::None.is_exit());
    }

    #[test]
    fn serializes_with_tag() {
        let action = Action::EnterLong {
            stop_loss: Some(95.0),
            take_profit: Some(110.0),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(
            json,
            r#"{"action":"enter_long","stop_loss":95.0,"take_profit":110.0}"#
        );
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn display_formats_levels() {
        let action = Action::EnterShort {
            stop_loss: Some(105.0),
            take_profit: None,
        };
        assert_eq!(action.to_string(), "enter_short(sl=105.0000, tp=-)");
        assert_eq!(Action::CloseAny.to_string(), "close_any");
    }
}
