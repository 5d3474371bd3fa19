pub mod tracker;

use chrono::{DateTime, Local};
use tracker::Direction;

/// A threshold crossing worth telling someone about.
#[derive(Debug, Clone)]
pub struct Alert {
    pub price: f64,
    pub direction: Direction,
    pub at: DateTime<Local>,
}

impl Alert {
    pub fn new(price: f64, direction: Direction) -> Self {
        Self {
            price,
            direction,
            at: Local::now(),
        }
    }

    pub fn message(&self) -> String {
        format!("当前价格: {} [{}]", self.price, self.direction)
    }
}
