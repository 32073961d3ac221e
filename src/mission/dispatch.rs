use std::collections::{HashMap, HashSet};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::MissionConfig;
use crate::flight::drone::Drone;
use crate::flight::simulator::FlightSimulator;
use crate::flight::Move;
use crate::graph::graph::VisibilityGraph;
use crate::graph::pathfinder::find_waypoints;
use crate::mission::MissionError;
use crate::spatial::polygon::Polygon;
use crate::LngLat;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub order_no: String,
    pub destination: LngLat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderOutcome {
    Delivered,
    ValidButNotDelivered,
    /// No visible route to the destination, or the stepper could not fly it.
    Unreachable,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderResult {
    pub order_no: String,
    pub destination: LngLat,
    /// Straight-line distance from the depot; `None` when unreachable.
    pub distance: Option<f64>,
    pub outcome: OrderOutcome,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DeliveryReport {
    /// One entry per request, in the order deliveries were attempted.
    pub results: Vec<OrderResult>,
    pub flight_log: Vec<Move>,
    pub delivered: usize,
    pub battery_remaining: u32,
}

/// Runs a full day of deliveries from the depot.
///
/// Requests are attempted nearest first. The first route the battery cannot
/// cover ends the run, since every later destination is at least as far.
pub fn run_deliveries(
    config: &MissionConfig,
    requests: &[DeliveryRequest],
    no_fly_zones: &[Polygon],
) -> Result<DeliveryReport, MissionError> {
    config.depot.validate()?;
    if requests.is_empty() {
        return Ok(empty_day(config));
    }
    let graph = VisibilityGraph::build(config.depot, &unique_destinations(requests), no_fly_zones)?;
    run_deliveries_on_graph(config, &graph, requests, no_fly_zones)
}

/// Same as [`run_deliveries`] over a graph built ahead of time, e.g. one
/// loaded from a bundle. `no_fly_zones` should be the zones the graph was
/// built against; the stepper checks every move against them.
///
/// Destinations that are not nodes of `graph` are reported as unreachable.
pub fn run_deliveries_on_graph(
    config: &MissionConfig,
    graph: &VisibilityGraph,
    requests: &[DeliveryRequest],
    no_fly_zones: &[Polygon],
) -> Result<DeliveryReport, MissionError> {
    let depot = config.depot;
    depot.validate()?;
    if requests.is_empty() {
        return Ok(empty_day(config));
    }
    for request in requests {
        request.destination.validate()?;
    }
    if !graph.contains(&depot) {
        warn!("Depot {depot} is not a node of the supplied graph");
    }

    let destinations = unique_destinations(requests);
    let waypoints: HashMap<LngLat, Option<Vec<LngLat>>> = destinations
        .iter()
        .map(|d| (*d, find_waypoints(graph, &depot, d)))
        .collect();

    let mut scheduled = Vec::with_capacity(requests.len());
    for request in requests {
        let reachable = matches!(waypoints.get(&request.destination), Some(Some(_)));
        let distance = if reachable {
            Some(depot.try_distance_to(&request.destination)?)
        } else {
            warn!(
                "Order {} is unreachable from the depot",
                request.order_no
            );
            None
        };
        scheduled.push((request, distance));
    }
    scheduled.sort_by(|a, b| {
        a.1.unwrap_or(f64::INFINITY)
            .total_cmp(&b.1.unwrap_or(f64::INFINITY))
    });

    let simulator = FlightSimulator::new(config.max_steps_per_leg);
    let mut drone = Drone::new(depot, config.battery_capacity);
    let mut routes: HashMap<LngLat, Vec<Move>> = HashMap::new();
    let mut report = DeliveryReport::default();
    let mut out_of_battery = false;

    for (request, distance) in scheduled {
        let outcome = match (distance, waypoints.get(&request.destination)) {
            (Some(_), Some(Some(path))) if !out_of_battery => {
                let moves = match routes.get(&request.destination) {
                    Some(route) => Some(simulator.replay(&request.order_no, route)),
                    None => match simulator.simulate(
                        drone.position(),
                        path,
                        &request.order_no,
                        no_fly_zones,
                    ) {
                        Ok(moves) => {
                            routes.insert(request.destination, moves.clone());
                            Some(moves)
                        }
                        Err(err) => {
                            warn!("Cannot fly order {}: {err}", request.order_no);
                            None
                        }
                    },
                };

                match moves {
                    None => OrderOutcome::Unreachable,
                    Some(moves) if !drone.has_capacity(moves.len()) => {
                        info!(
                            "Battery exhausted at order {} ({} moves needed, {} left)",
                            request.order_no,
                            moves.len(),
                            drone.battery()
                        );
                        out_of_battery = true;
                        OrderOutcome::ValidButNotDelivered
                    }
                    Some(moves) => {
                        drone
                            .follow_path(&request.order_no, &moves)
                            .map_err(|source| MissionError::Flight {
                                order_no: request.order_no.clone(),
                                source,
                            })?;
                        report.flight_log.append(&mut drone.take_log());
                        drone.reset(depot);
                        report.delivered += 1;
                        OrderOutcome::Delivered
                    }
                }
            }
            (Some(_), _) => OrderOutcome::ValidButNotDelivered,
            (None, _) => OrderOutcome::Unreachable,
        };

        report.results.push(OrderResult {
            order_no: request.order_no.clone(),
            destination: request.destination,
            distance,
            outcome,
        });
    }

    report.battery_remaining = drone.battery();
    info!(
        "Delivered {} of {} orders, {} battery remaining",
        report.delivered,
        requests.len(),
        report.battery_remaining
    );
    Ok(report)
}

fn empty_day(config: &MissionConfig) -> DeliveryReport {
    DeliveryReport {
        battery_remaining: config.battery_capacity,
        ..DeliveryReport::default()
    }
}

fn unique_destinations(requests: &[DeliveryRequest]) -> Vec<LngLat> {
    let mut seen = HashSet::new();
    requests
        .iter()
        .map(|r| r.destination)
        .filter(|d| seen.insert(*d))
        .collect()
}
