//! Fixed-capacity buffers backing the indicator recurrences.
//!
//! `RollingWindow` keeps the trailing N inputs for windowed statistics.
//! `LagBuffer` keeps the last N samples of a recurrence for `x[t-k]` access.

use std::collections::VecDeque;

/// Trailing window of the last `capacity` values.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be >= 1");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Push a value, evicting the oldest once full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.values.iter()
    }

    /// Arithmetic mean, once the window is full.
    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.capacity as f64)
    }

    /// Population standard deviation (divide by N), once the window is full.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.capacity as f64;
        Some(variance.sqrt())
    }

    /// Maximum, once the window is full.
    pub fn max(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        self.values.iter().copied().reduce(f64::max)
    }

    /// Minimum, once the window is full.
    pub fn min(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        self.values.iter().copied().reduce(f64::min)
    }
}

/// Last `N` samples of a recurrence, newest at lag 0. Zero-initialized.
#[derive(Debug, Clone, Copy)]
pub struct LagBuffer<const N: usize> {
    values: [f64; N],
}

impl<const N: usize> Default for LagBuffer<N> {
    fn default() -> Self {
        Self { values: [0.0; N] }
    }
}

impl<const N: usize> LagBuffer<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every slot holds `value`.
    pub fn filled(value: f64) -> Self {
        Self { values: [value; N] }
    }

    /// Shift everything one lag back and store `value` at lag 0.
    pub fn push(&mut self, value: f64) {
        self.values.copy_within(0..N - 1, 1);
        self.values[0] = value;
    }

    /// Sample `lag` steps back. Lags beyond the buffer read as zero.
    pub fn at(&self, lag: usize) -> f64 {
        self.values.get(lag).copied().unwrap_or(0.0)
    }
}
