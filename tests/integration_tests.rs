use dronepath_engine::config::MissionConfig;
use dronepath_engine::data::{deserialize_graph, serialize_graph};
use dronepath_engine::flight::drone::Drone;
use dronepath_engine::flight::simulator::FlightSimulator;
use dronepath_engine::graph::graph::VisibilityGraph;
use dronepath_engine::graph::pathfinder::find_waypoints;
use dronepath_engine::mission::dispatch::{
    run_deliveries, run_deliveries_on_graph, DeliveryRequest, OrderOutcome,
};
use dronepath_engine::spatial::polygon::{Boundary, Polygon};
use dronepath_engine::LngLat;

fn square_zone() -> Polygon {
    Polygon::new(vec![
        LngLat::new(0.001, -0.001),
        LngLat::new(0.001, 0.001),
        LngLat::new(0.002, 0.001),
        LngLat::new(0.002, -0.001),
    ])
    .expect("zone")
    .with_name("square")
}

#[test]
fn integration_end_to_end_straight_delivery() {
    let depot = LngLat::new(0.0, 0.0);
    let dest = LngLat::new(0.00075, 0.0);
    let graph = VisibilityGraph::build(depot, &[dest], &[]).expect("graph");

    let waypoints = find_waypoints(&graph, &depot, &dest).expect("path");
    assert_eq!(waypoints, vec![depot, dest]);

    let sim = FlightSimulator::new(10_000);
    let moves = sim.simulate(depot, &waypoints, "ORDER001", &[]).expect("moves");
    assert_eq!(moves.len(), 10);

    let mut drone = Drone::new(depot, 2000);
    assert!(drone.has_capacity(moves.len()));
    drone.follow_path("ORDER001", &moves).expect("follow");
    assert_eq!(drone.battery(), 1990);
    assert!(drone.position().close_to(&depot));
}

#[test]
fn integration_detour_stays_out_of_zone() {
    let depot = LngLat::new(0.0, 0.0);
    let dest = LngLat::new(0.003, 0.0);
    let zone = square_zone();
    let zones = vec![zone.clone()];

    let graph = VisibilityGraph::build(depot, &[dest], &zones).expect("graph");
    let waypoints = find_waypoints(&graph, &depot, &dest).expect("path");
    assert!(waypoints.len() > 2);

    let sim = FlightSimulator::new(10_000);
    let moves = sim.simulate(depot, &waypoints, "ORDER002", &zones).expect("moves");
    for m in &moves {
        assert!(!zone.is_crossed_by(&m.position, &m.end_position()));
        assert!(!zone.contains(&m.position, Boundary::Exclusive));
    }
    assert!(moves[moves.len() - 2].end_position().close_to(&depot));
}

#[test]
fn integration_mission_report() {
    let config = MissionConfig {
        depot: LngLat::new(0.0, 0.0),
        ..MissionConfig::default()
    };
    let requests = vec![
        DeliveryRequest {
            order_no: "behind-zone".into(),
            destination: LngLat::new(0.003, 0.0),
        },
        DeliveryRequest {
            order_no: "close".into(),
            destination: LngLat::new(0.0, 0.0006),
        },
    ];
    let report = run_deliveries(&config, &requests, &[square_zone()]).expect("report");
    assert_eq!(report.delivered, 2);
    assert_eq!(report.results[0].order_no, "close");
    assert!(report
        .results
        .iter()
        .all(|r| r.outcome == OrderOutcome::Delivered));
    assert_eq!(
        report.battery_remaining as usize,
        2000 - report.flight_log.len()
    );
}

#[test]
fn integration_mission_from_bundle() {
    let config = MissionConfig {
        depot: LngLat::new(0.0, 0.0),
        ..MissionConfig::default()
    };
    let zones = vec![square_zone()];
    let destination = LngLat::new(0.003, 0.0);
    let graph = VisibilityGraph::build(config.depot, &[destination], &zones).expect("graph");
    let bundle = serialize_graph(&graph).expect("serialize");
    let restored = deserialize_graph(&bundle).expect("deserialize");

    let requests = vec![DeliveryRequest {
        order_no: "from-bundle".into(),
        destination,
    }];
    let from_bundle = run_deliveries_on_graph(&config, &restored, &requests, &zones).expect("report");
    let fresh = run_deliveries(&config, &requests, &zones).expect("report");
    assert_eq!(from_bundle.delivered, 1);
    assert_eq!(from_bundle.flight_log.len(), fresh.flight_log.len());
    for (a, b) in from_bundle.flight_log.iter().zip(&fresh.flight_log) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.direction, b.direction);
    }
}
