use std::fmt;

pub const DEFAULT_SEED: f64 = 366.0;
pub const DEFAULT_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("上升"),
            Direction::Down => f.write_str("下降"),
        }
    }
}

/// Slack when counting steps, so a price one decimal step away still counts
/// as a full step despite binary rounding.
const STEP_EPSILON: f64 = 1e-9;

/// Tracks the last alarm-worthy price level.
///
/// The reference only ever moves in whole multiples of `step`, and only once
/// the price has diverged from it by at least one full step. It is stored as
/// a step count from the seed so rounding error never accumulates.
#[derive(Debug, Clone)]
pub struct AlarmTracker {
    seed: f64,
    step: f64,
    offset: i64, // whole steps away from `seed`
}

impl AlarmTracker {
    pub fn new(seed: f64, step: f64) -> Self {
        Self {
            seed,
            step,
            offset: 0,
        }
    }

    pub fn reference(&self) -> f64 {
        self.seed + self.offset as f64 * self.step
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Feeds a new price and returns the direction to notify, if any.
    ///
    /// A rise from a zero reference moves the reference but stays silent.
    pub fn evaluate(&mut self, price: f64) -> Option<Direction> {
        let reference = self.reference();
        let diff = price - reference;
        let steps = (diff.abs() / self.step + STEP_EPSILON).floor();
        if steps.is_nan() || steps < 1.0 {
            return None;
        }

        let steps = steps as i64;
        if diff > 0.0 {
            let armed = reference != 0.0;
            self.offset += steps;
            armed.then_some(Direction::Up)
        } else {
            self.offset -= steps;
            Some(Direction::Down)
        }
    }
}

impl Default for AlarmTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SEED, DEFAULT_STEP)
    }
}
