use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use dronepath_engine::data::{write_graph_to_file, DEFAULT_GRAPH_PATH};
use dronepath_engine::graph::graph::VisibilityGraph;
use dronepath_engine::spatial::polygon::Polygon;
use dronepath_engine::LngLat;
use log::{info, warn};
use reqwest::blocking::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct Restaurant {
    name: String,
    longitude: f64,
    latitude: f64,
}

#[derive(Debug, Serialize)]
struct GraphMetadata {
    source_url: String,
    restaurants: usize,
    no_fly_zones: usize,
    nodes: usize,
    directed_edges: usize,
    generated_at_epoch: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let base_url = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: build_graph <rest-base-url>"))?;
    let base_url = if base_url.ends_with('/') {
        base_url
    } else {
        format!("{base_url}/")
    };

    let client = Client::builder()
        .user_agent("dronepath-engine-graph-builder/0.1")
        .build()?;

    let no_fly_zones: Vec<Polygon> = fetch_json(&client, &base_url, "noFlyZones")?;
    let restaurants: Vec<Restaurant> = fetch_json(&client, &base_url, "restaurants")?;
    if restaurants.is_empty() {
        warn!("REST server returned no restaurants");
    }
    info!(
        "Fetched {} restaurants and {} no-fly zones from {}",
        restaurants.len(),
        no_fly_zones.len(),
        base_url
    );

    let destinations: Vec<LngLat> = restaurants
        .iter()
        .map(|r| LngLat::new(r.longitude, r.latitude))
        .collect();
    let graph = VisibilityGraph::build(LngLat::depot(), &destinations, &no_fly_zones)
        .with_context(|| "failed to build visibility graph")?;
    for (restaurant, point) in restaurants.iter().zip(&destinations) {
        if graph.edges_from(point).is_empty() {
            warn!("Restaurant {} has no visible edges", restaurant.name);
        }
    }

    let graph_path = PathBuf::from(DEFAULT_GRAPH_PATH);
    write_graph_to_file(&graph, &graph_path)
        .with_context(|| format!("failed to write graph to {}", graph_path.display()))?;

    let metadata = GraphMetadata {
        source_url: base_url.clone(),
        restaurants: restaurants.len(),
        no_fly_zones: no_fly_zones.len(),
        nodes: graph.len(),
        directed_edges: graph.edge_count(),
        generated_at_epoch: current_epoch_seconds(),
    };

    let metadata_path = graph_path.with_extension("meta.json");
    let metadata_json = serde_json::to_vec_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("failed to write metadata to {}", metadata_path.display()))?;

    info!(
        "Wrote visibility graph to {} ({} nodes, {} edges)",
        graph_path.display(),
        metadata.nodes,
        metadata.directed_edges
    );

    Ok(())
}

fn fetch_json<T: DeserializeOwned>(client: &Client, base_url: &str, endpoint: &str) -> Result<T> {
    let url = format!("{base_url}{endpoint}");
    let response = client
        .get(&url)
        .send()
        .with_context(|| format!("failed to query {url}"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error status"))?;
    response
        .json()
        .with_context(|| format!("failed to parse {endpoint} payload"))
}

fn current_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
