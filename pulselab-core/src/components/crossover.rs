//! Two-series crossover detection.
//!
//! `a` crosses above `b` at bar i iff `a[i] > b[i]` and `a[i-1] <= b[i-1]`.
//! Crossing below is the mirror. Equality on the prior bar counts as not yet
//! crossed, so a flat run that later separates fires exactly once.

use serde::{Deserialize, Serialize};

use super::indicator::Series;

/// Outcome of comparing two series across one bar boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cross {
    #[default]
    None,
    Above,
    Below,
}

impl Cross {
    /// Classify the move from (`prev_a`, `prev_b`) to (`cur_a`, `cur_b`).
    pub fn detect(prev_a: f64, prev_b: f64, cur_a: f64, cur_b: f64) -> Self {
        if cur_a > cur_b && prev_a <= prev_b {
            Cross::Above
        } else if cur_a < cur_b && prev_a >= prev_b {
            Cross::Below
        } else {
            Cross::None
        }
    }

    /// Crossover of `a` against `b` at bar `i`.
    ///
    /// `Cross::None` when `i == 0` or any of the four values is undefined.
    pub fn at(a: &Series, b: &Series, i: usize) -> Self {
        let Some(prev) = i.checked_sub(1) else {
            return Cross::None;
        };
        match (a.get(prev), b.get(prev), a.get(i), b.get(i)) {
            (Some(pa), Some(pb), Some(ca), Some(cb)) => Cross::detect(pa, pb, ca, cb),
            _ => Cross::None,
        }
    }

    /// Crossover of `a` against a constant level at bar `i`.
    pub fn at_level(a: &Series, level: f64, i: usize) -> Self {
        let Some(prev) = i.checked_sub(1) else {
            return Cross::None;
        };
        match (a.get(prev), a.get(i)) {
            (Some(pa), Some(ca)) => Cross::detect(pa, level, ca, level),
            _ => Cross::None,
        }
    }

    /// Crossover between the two newest values of each series.
    pub fn latest(a: &Series, b: &Series) -> Self {
        match a.len().min(b.len()).checked_sub(1) {
            Some(i) => Cross::at(a, b, i),
            None => Cross::None,
        }
    }

    pub fn is_above(self) -> bool {
        self == Cross::Above
    }

    pub fn is_below(self) -> bool {
        self == Cross::Below
    }
}

pub fn crosses_above(a: &Series, b: &Series, i: usize) -> bool {
    Cross::at(a, b, i).is_above()
}

pub fn crosses_below(a: &Series, b: &Series, i: usize) -> bool {
    Cross::at(a, b, i).is_below()
}
