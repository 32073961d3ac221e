use serde::{Deserialize, Serialize};

use crate::LngLat;

pub const DEFAULT_BATTERY: u32 = 2000;
pub const DEFAULT_MAX_STEPS_PER_LEG: usize = 10_000;

/// Per-run settings. Every field falls back to its default when omitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub depot: LngLat,
    pub battery_capacity: u32,
    /// Upper bound on single steps towards one waypoint before the stepper
    /// gives up on the route.
    pub max_steps_per_leg: usize,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            depot: LngLat::depot(),
            battery_capacity: DEFAULT_BATTERY,
            max_steps_per_leg: DEFAULT_MAX_STEPS_PER_LEG,
        }
    }
}
