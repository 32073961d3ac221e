use dronepath_engine::config::MissionConfig;
use dronepath_engine::data::{load_graph_bundle, MapInputs};
use dronepath_engine::graph::graph::VisibilityGraph;
use dronepath_engine::graph::pathfinder::find_waypoints;
use dronepath_engine::mission::dispatch::{run_deliveries, run_deliveries_on_graph, DeliveryReport};
use dronepath_engine::spatial::polygon::Polygon;
use dronepath_engine::LngLat;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Graph written by `build_graph`, loaded once per container.
static PREBUILT_GRAPH: Lazy<Option<VisibilityGraph>> = Lazy::new(load_graph_bundle);

/// The prebuilt graph, if it has a node for every point of the request.
fn prebuilt_for<'a>(points: impl IntoIterator<Item = &'a LngLat>) -> Option<&'static VisibilityGraph> {
    let graph = PREBUILT_GRAPH.as_ref()?;
    points.into_iter().all(|p| graph.contains(p)).then_some(graph)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineRequest {
    Plan {
        #[serde(default)]
        config: MissionConfig,
        #[serde(flatten)]
        inputs: MapInputs,
    },
    Route {
        start: LngLat,
        destination: LngLat,
        #[serde(default)]
        no_fly_zones: Vec<Polygon>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineResponse {
    Plan {
        report: DeliveryReport,
    },
    Route {
        waypoints: Vec<LngLat>,
        length: f64,
    },
    Error {
        message: String,
    },
}

fn route_length(waypoints: &[LngLat]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

async fn handler(event: LambdaEvent<EngineRequest>) -> Result<EngineResponse, Error> {
    let req = event.payload;
    match req {
        EngineRequest::Plan { config, inputs } => {
            let points = std::iter::once(&config.depot)
                .chain(inputs.deliveries.iter().map(|d| &d.destination));
            let result = match prebuilt_for(points) {
                Some(graph) => {
                    debug!("Planning on the prebuilt graph");
                    run_deliveries_on_graph(&config, graph, &inputs.deliveries, &inputs.no_fly_zones)
                }
                None => run_deliveries(&config, &inputs.deliveries, &inputs.no_fly_zones),
            };
            match result {
                Ok(report) => Ok(EngineResponse::Plan { report }),
                Err(err) => Ok(EngineResponse::Error { message: err.to_string() }),
            }
        }
        EngineRequest::Route { start, destination, no_fly_zones } => {
            let built;
            let graph = match prebuilt_for([&start, &destination]) {
                Some(graph) => graph,
                None => match VisibilityGraph::build(start, &[destination], &no_fly_zones) {
                    Ok(graph) => {
                        built = graph;
                        &built
                    }
                    Err(err) => return Ok(EngineResponse::Error { message: err.to_string() }),
                },
            };
            if let Some(waypoints) = find_waypoints(graph, &start, &destination) {
                let length = route_length(&waypoints);
                Ok(EngineResponse::Route { waypoints, length })
            } else {
                Ok(EngineResponse::Error { message: "No path found".into() })
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}
