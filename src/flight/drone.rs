use crate::flight::{FlightError, Move};
use crate::LngLat;

/// Battery units consumed by every move, hovering included.
pub const MOVE_COST: u32 = 1;

/// Execution state of the single delivery drone.
///
/// Battery is a whole-run resource: [`Drone::reset`] only clears the trip.
#[derive(Clone, Debug)]
pub struct Drone {
    battery: u32,
    position: LngLat,
    order_no: Option<String>,
    log: Vec<Move>,
}

impl Drone {
    pub fn new(depot: LngLat, battery: u32) -> Self {
        Drone {
            battery,
            position: depot,
            order_no: None,
            log: Vec::new(),
        }
    }

    pub fn battery(&self) -> u32 {
        self.battery
    }

    pub fn position(&self) -> LngLat {
        self.position
    }

    pub fn order_no(&self) -> Option<&str> {
        self.order_no.as_deref()
    }

    pub fn log(&self) -> &[Move] {
        &self.log
    }

    pub fn has_capacity(&self, moves: usize) -> bool {
        u64::from(self.battery) >= moves as u64 * u64::from(MOVE_COST)
    }

    /// Applies every move in order. Refuses the whole route, changing nothing,
    /// if the battery cannot cover it.
    pub fn follow_path(&mut self, order_no: &str, moves: &[Move]) -> Result<(), FlightError> {
        if !self.has_capacity(moves.len()) {
            return Err(FlightError::InsufficientBattery {
                needed: moves.len(),
                remaining: self.battery,
            });
        }
        self.order_no = Some(order_no.to_owned());
        for m in moves {
            self.log.push(m.clone());
            self.position = m.end_position();
            self.battery -= MOVE_COST;
        }
        Ok(())
    }

    /// Back to the depot with an empty log, ready for the next delivery.
    pub fn reset(&mut self, depot: LngLat) {
        self.position = depot;
        self.order_no = None;
        self.log.clear();
    }

    /// Hands the current trip's log to the caller, leaving it empty.
    pub fn take_log(&mut self) -> Vec<Move> {
        std::mem::take(&mut self.log)
    }
}
