use std::time::Instant;

use log::debug;
use once_cell::unsync::OnceCell;

use crate::flight::{FlightError, Move};
use crate::geometry::direction::Direction;
use crate::spatial::polygon::Polygon;
use crate::LngLat;

/// Expands waypoint routes into single-step moves and mirrors them home.
pub struct FlightSimulator {
    epoch: OnceCell<Instant>,
    max_steps_per_leg: usize,
}

impl FlightSimulator {
    pub fn new(max_steps_per_leg: usize) -> Self {
        FlightSimulator {
            epoch: OnceCell::new(),
            max_steps_per_leg,
        }
    }

    /// Nanoseconds since the first tick this simulator handed out.
    fn tick(&self) -> u64 {
        let epoch = self.epoch.get_or_init(Instant::now);
        u64::try_from(epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn record(&self, position: LngLat, direction: Option<Direction>, order_no: &str) -> Move {
        Move {
            position,
            direction,
            order_no: order_no.to_owned(),
            tick: self.tick(),
        }
    }

    /// Flies `start -> waypoints...`, hovers once on arrival, then retraces the
    /// outbound moves back to `start` and hovers again.
    pub fn simulate(
        &self,
        start: LngLat,
        waypoints: &[LngLat],
        order_no: &str,
        no_fly_zones: &[Polygon],
    ) -> Result<Vec<Move>, FlightError> {
        let mut moves = Vec::new();
        let mut current = start;
        for target in waypoints {
            current = self.fly_leg(current, target, order_no, no_fly_zones, &mut moves)?;
        }
        moves.push(self.record(current, None, order_no));

        let outbound = moves.len();
        let mut homebound = self.mirror(&moves, order_no);
        moves.append(&mut homebound);
        moves.push(self.record(start, None, order_no));

        debug!(
            "Order {order_no}: {} outbound moves, {} in total",
            outbound,
            moves.len()
        );
        Ok(moves)
    }

    /// Copies a previously simulated route under a new order number.
    pub fn replay(&self, order_no: &str, route: &[Move]) -> Vec<Move> {
        route
            .iter()
            .map(|m| self.record(m.position, m.direction, order_no))
            .collect()
    }

    fn fly_leg(
        &self,
        mut current: LngLat,
        target: &LngLat,
        order_no: &str,
        no_fly_zones: &[Polygon],
        moves: &mut Vec<Move>,
    ) -> Result<LngLat, FlightError> {
        let mut steps = 0usize;
        while !current.close_to(target) {
            if steps == self.max_steps_per_leg {
                return Err(FlightError::StepLimit {
                    limit: self.max_steps_per_leg,
                    target: *target,
                });
            }
            let direction = best_direction(&current, target, no_fly_zones)
                .ok_or(FlightError::NoLegalStep { at: current })?;
            moves.push(self.record(current, Some(direction), order_no));
            current = current.next_position(Some(direction));
            steps += 1;
        }
        Ok(current)
    }

    /// Walks the outbound moves backwards. The move leaving position `i`
    /// undoes the outbound move that arrived there, i.e. takes the opposite of
    /// the direction recorded at `i - 1`.
    fn mirror(&self, outbound: &[Move], order_no: &str) -> Vec<Move> {
        (1..outbound.len())
            .rev()
            .map(|i| {
                let back = outbound[i - 1].direction.map(Direction::opposite);
                self.record(outbound[i].position, back, order_no)
            })
            .collect()
    }
}

/// Direction whose single step lands closest to `target` without crossing a
/// zone. Ties go to the lower compass index.
fn best_direction(at: &LngLat, target: &LngLat, no_fly_zones: &[Polygon]) -> Option<Direction> {
    let mut best: Option<(Direction, f64)> = None;
    for direction in Direction::ALL {
        let next = at.next_position(Some(direction));
        if no_fly_zones.iter().any(|zone| zone.is_crossed_by(at, &next)) {
            continue;
        }
        let distance = next.distance_to(target);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((direction, distance));
        }
    }
    best.map(|(direction, _)| direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directions(moves: &[Move]) -> Vec<Option<Direction>> {
        moves.iter().map(|m| m.direction).collect()
    }

    #[test]
    fn straight_flight_east_and_back() {
        let sim = FlightSimulator::new(10_000);
        let start = LngLat::new(0.0, 0.0);
        let dest = LngLat::new(0.0006, 0.0);
        let moves = sim.simulate(start, &[start, dest], "A1", &[]).expect("moves");

        // 0.00045 is already within one step of 0.0006.
        let e = Some(Direction::E);
        let w = Some(Direction::W);
        assert_eq!(directions(&moves), vec![e, e, e, None, w, w, w, None]);
        assert!(moves.iter().all(|m| m.order_no == "A1"));
        assert_eq!(moves.last().unwrap().position, start);
    }

    #[test]
    fn four_step_flight_has_ten_moves() {
        let sim = FlightSimulator::new(10_000);
        let start = LngLat::new(0.0, 0.0);
        let dest = LngLat::new(0.00075, 0.0);
        let moves = sim.simulate(start, &[start, dest], "A2", &[]).expect("moves");
        assert_eq!(moves.len(), 10);
        assert_eq!(moves.iter().filter(|m| m.is_hover()).count(), 2);

        let back = &moves[moves.len() - 2];
        assert!(back.end_position().close_to(&start));
    }

    #[test]
    fn return_leg_mirrors_outbound() {
        let sim = FlightSimulator::new(10_000);
        let start = LngLat::new(0.0, 0.0);
        let dest = LngLat::new(0.0, 0.0006);
        let moves = sim.simulate(start, &[dest], "N1", &[]).expect("moves");
        let half = moves.len() / 2;
        let (out, back) = moves.split_at(half);
        for (i, m) in back[..back.len() - 1].iter().enumerate() {
            let outbound = &out[out.len() - 2 - i];
            assert_eq!(m.direction, outbound.direction.map(Direction::opposite));
            assert_eq!(m.position, out[out.len() - 1 - i].position);
        }
    }

    #[test]
    fn empty_route_just_hovers() {
        let sim = FlightSimulator::new(10_000);
        let start = LngLat::new(1.0, 1.0);
        let moves = sim.simulate(start, &[], "H", &[]).expect("moves");
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(Move::is_hover));
    }

    #[test]
    fn steps_never_cross_a_zone() {
        let sim = FlightSimulator::new(10_000);
        let zone = Polygon::new(vec![
            LngLat::new(0.001, -0.001),
            LngLat::new(0.001, 0.001),
            LngLat::new(0.002, 0.001),
            LngLat::new(0.002, -0.001),
        ])
        .expect("zone");
        let start = LngLat::new(0.0, 0.0);
        let route = [
            start,
            LngLat::new(0.001, -0.001),
            LngLat::new(0.002, -0.001),
            LngLat::new(0.003, 0.0),
        ];
        let moves = sim
            .simulate(start, &route, "Z", std::slice::from_ref(&zone))
            .expect("moves");
        for m in &moves {
            assert!(!zone.is_crossed_by(&m.position, &m.end_position()));
        }
        let arrival = moves.iter().find(|m| m.is_hover()).expect("hover");
        assert!(arrival.position.close_to(&LngLat::new(0.003, 0.0)));
    }

    #[test]
    fn step_limit_stops_runaway_legs() {
        let sim = FlightSimulator::new(2);
        let start = LngLat::new(0.0, 0.0);
        let err = sim
            .simulate(start, &[LngLat::new(1.0, 0.0)], "L", &[])
            .unwrap_err();
        assert!(matches!(err, FlightError::StepLimit { limit: 2, .. }));
    }

    #[test]
    fn boxed_in_start_has_no_legal_step() {
        // Tiny square around the start, corners off every compass ray, so
        // each of the 16 steps leaves through an edge.
        let corners = [10.0_f64, 100.0, 190.0, 280.0]
            .iter()
            .map(|deg| {
                let rad = deg.to_radians();
                LngLat::new(0.00005 * rad.cos(), 0.00005 * rad.sin())
            })
            .collect();
        let cage = Polygon::new(corners).expect("zone");
        let start = LngLat::new(0.0, 0.0);
        assert!(cage.contains(&start, crate::spatial::polygon::Boundary::Exclusive));

        let sim = FlightSimulator::new(10_000);
        let err = sim
            .simulate(start, &[LngLat::new(0.001, 0.0)], "C", &[cage])
            .unwrap_err();
        assert_eq!(err, FlightError::NoLegalStep { at: start });
    }

    #[test]
    fn replay_retags_moves() {
        let sim = FlightSimulator::new(10_000);
        let start = LngLat::new(0.0, 0.0);
        let route = sim
            .simulate(start, &[LngLat::new(0.0006, 0.0)], "first", &[])
            .expect("moves");
        let again = sim.replay("second", &route);
        assert_eq!(again.len(), route.len());
        for (a, b) in route.iter().zip(&again) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.direction, b.direction);
            assert_eq!(b.order_no, "second");
            assert!(b.tick >= a.tick);
        }
    }
}
