//! Decision components.
//!
//! - Indicator trait and the NaN-backed `Series` it produces
//! - Crossover detection between two series or a series and a level
//! - Protective-level calculation for entries
//! - The strategy contract, its variants and the per-instance driver
//! - The registry that turns a variant id and parameter map into an instance

pub mod crossover;
pub mod factory;
pub mod indicator;
pub mod risk;
pub mod strategy;

pub use crossover::{crosses_above, crosses_below, Cross};
pub use factory::{
    build, build_strategy, default_params, ConfigError, ParamKind, ParamSpec, Params,
    StrategyKind,
};
pub use indicator::{compute, Indicator, Series};
pub use risk::{OrderIntent, TradeSide};
pub use strategy::{Strategy, StrategyInstance};
