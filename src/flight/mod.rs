pub mod drone;
pub mod simulator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::direction::Direction;
use crate::LngLat;

/// One tick of flight: the drone was at `position` and then moved in
/// `direction`, or hovered when `direction` is `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub position: LngLat,
    pub direction: Option<Direction>,
    pub order_no: String,
    /// Nanoseconds since the simulator produced its first move. Diagnostic only.
    pub tick: u64,
}

impl Move {
    pub fn end_position(&self) -> LngLat {
        self.position.next_position(self.direction)
    }

    pub fn is_hover(&self) -> bool {
        self.direction.is_none()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FlightError {
    #[error("every direction from {at} crosses a no-fly zone")]
    NoLegalStep { at: LngLat },
    #[error("no arrival at {target} within {limit} steps")]
    StepLimit { limit: usize, target: LngLat },
    #[error("route needs {needed} moves but only {remaining} battery remains")]
    InsufficientBattery { needed: usize, remaining: u32 },
}
