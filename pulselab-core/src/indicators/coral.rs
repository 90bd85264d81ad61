//! Coral Trend.
//!
//! Six cascaded first-order low-pass stages sharing one coefficient:
//!   di = (smoothing - 1) / 2 + 1,  c1 = 2 / (di + 1),  c2 = 1 - c1
//!   i1 = c1·close + c2·i1[-1],  i(k) = c1·i(k-1) + c2·i(k)[-1]  for k = 2..6
//!
//! Combined with a cubic in the damping constant `cd`:
//!   line = -cd³·i6 + c3·i5 + c4·i4 + c5·i3
//!   c3 = 3(cd² + cd³),  c4 = -3(2cd² + cd + cd³),  c5 = 3cd + 1 + cd³ + 3cd²
//!
//! The weights sum to one, so every stage is seeded with the first close.
//! Direction is the sign of line[i] - line[i-1], held while the line is flat.
//! Lookback: 0 (direction is 0 on the first bar).

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoralPoint {
    pub line: f64,
    /// +1 rising, -1 falling, 0 before the first move.
    pub direction: i8,
}

#[derive(Debug, Clone)]
pub struct CoralTrend {
    smoothing: usize,
    c1: f64,
    c2: f64,
    weights: [f64; 4],
    stages: Option<[f64; 6]>,
    prev_line: Option<f64>,
    direction: i8,
    name: String,
}

impl CoralTrend {
    pub fn new(smoothing: usize, cd: f64) -> Self {
        assert!(smoothing >= 1, "Coral smoothing must be >= 1");
        assert!(cd > 0.0 && cd <= 1.0, "Coral cd must be in (0, 1]");
        let di = (smoothing as f64 - 1.0) / 2.0 + 1.0;
        let c1 = 2.0 / (di + 1.0);
        let cd2 = cd * cd;
        let cd3 = cd2 * cd;
        // Weights for stages 6, 5, 4, 3.
        let weights = [
            -cd3,
            3.0 * (cd2 + cd3),
            -3.0 * (2.0 * cd2 + cd + cd3),
            3.0 * cd + 1.0 + cd3 + 3.0 * cd2,
        ];
        Self {
            smoothing,
            c1,
            c2: 1.0 - c1,
            weights,
            stages: None,
            prev_line: None,
            direction: 0,
            name: format!("coral_{smoothing}_{cd}"),
        }
    }

    pub fn smoothing(&self) -> usize {
        self.smoothing
    }

    pub fn next_point(&mut self, close: f64) -> CoralPoint {
        let stages = match self.stages.as_mut() {
            Some(stages) => {
                let mut input = close;
                for stage in stages.iter_mut() {
                    *stage = self.c1 * input + self.c2 * *stage;
                    input = *stage;
                }
                *stages
            }
            None => *self.stages.insert([close; 6]),
        };

        let line = self.weights[0] * stages[5]
            + self.weights[1] * stages[4]
            + self.weights[2] * stages[3]
            + self.weights[3] * stages[2];

        if let Some(prev) = self.prev_line {
            if line > prev {
                self.direction = 1;
            } else if line < prev {
                self.direction = -1;
            }
        }
        self.prev_line = Some(line);

        CoralPoint {
            line,
            direction: self.direction,
        }
    }
}

impl Indicator for CoralTrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    /// Returns the trend line.
    fn update(&mut self, bar: &Bar) -> Option<f64> {
        Some(self.next_point(bar.close).line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn coral_weights_sum_to_one() {
        for cd in [0.1, 0.4, 0.8, 1.0] {
            let coral = CoralTrend::new(21, cd);
            assert_approx(coral.weights.iter().sum::<f64>(), 1.0, 1e-12);
        }
    }

    #[test]
    fn coral_seeds_at_first_close() {
        let mut coral = CoralTrend::new(21, 0.4);
        let p = coral.next_point(100.0);
        assert_approx(p.line, 100.0, DEFAULT_EPSILON);
        assert_eq!(p.direction, 0);
        let p = coral.next_point(100.0);
        assert_approx(p.line, 100.0, DEFAULT_EPSILON);
        assert_eq!(p.direction, 0);
    }

    #[test]
    fn coral_direction_follows_trend_and_holds_when_flat() {
        let mut coral = CoralTrend::new(5, 0.4);
        coral.next_point(100.0);
        let mut last = coral.next_point(100.0);
        for i in 1..30 {
            last = coral.next_point(100.0 + i as f64);
        }
        assert_eq!(last.direction, 1);

        for i in 1..60 {
            last = coral.next_point(130.0 - 2.0 * i as f64);
        }
        assert_eq!(last.direction, -1);
    }

    #[test]
    fn coral_smoothing_1_tracks_input() {
        // di = 1, c1 = 1 → every stage equals the close.
        let mut coral = CoralTrend::new(1, 0.4);
        coral.next_point(10.0);
        let p = coral.next_point(12.0);
        assert_approx(p.line, 12.0, 1e-12);
        assert_eq!(p.direction, 1);
    }
}
