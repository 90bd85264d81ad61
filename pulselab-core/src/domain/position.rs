use serde::{Deserialize, Serialize};

/// Which way the book is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Flat,
    Long,
    Short,
}

impl Direction {
    /// +1 long, -1 short, 0 flat.
    pub fn sign(&self) -> i8 {
        match self {
            Direction::Flat => 0,
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }
}

/// Snapshot of the position as reported by the execution engine.
///
/// Strategies only read this. They never hold on to it between bars.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl Position {
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn long(entry_price: f64) -> Self {
        Self {
            direction: Direction::Long,
            entry_price: Some(entry_price),
            ..Self::default()
        }
    }

    pub fn short(entry_price: f64) -> Self {
        Self {
            direction: Direction::Short,
            entry_price: Some(entry_price),
            ..Self::default()
        }
    }

    pub fn with_levels(mut self, stop_loss: Option<f64>, take_profit: Option<f64>) -> Self {
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    pub fn is_flat(&self) -> bool {
        self.direction == Direction::Flat
    }

    pub fn is_long(&self) -> bool {
        self.direction == Direction::Long
    }

    pub fn is_short(&self) -> bool {
        self.direction == Direction::Short
    }
}
