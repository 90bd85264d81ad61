//! Domain types for PulseLab: bars, the bar buffer, positions, and actions.

pub mod action;
pub mod bar;
pub mod position;

pub use action::Action;
pub use bar::{Bar, BarSeries, DataError};
pub use position::{Direction, Position};
