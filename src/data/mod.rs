use std::fs;
use std::io::Cursor;
use std::path::Path;

use bincode::ErrorKind;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::graph::VisibilityGraph;
use crate::mission::dispatch::DeliveryRequest;
use crate::spatial::polygon::Polygon;

/// Compression level used when encoding serialized graph data.
const GRAPH_COMPRESSION_LEVEL: i32 = 19;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Zones and orders for one run, as they arrive in a `plan` request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapInputs {
    #[serde(default)]
    pub no_fly_zones: Vec<Polygon>,
    #[serde(default)]
    pub deliveries: Vec<DeliveryRequest>,
}

/// Where the graph builder writes its bundle and the service looks for it.
pub const DEFAULT_GRAPH_PATH: &str = "data/visibility.bin";

/// Environment variable overriding [`DEFAULT_GRAPH_PATH`] for the service.
pub const GRAPH_PATH_ENV: &str = "DRONEPATH_GRAPH";

/// Encodes a graph as zstd-compressed bincode. The point index is skipped and
/// rebuilt on load.
pub fn serialize_graph(graph: &VisibilityGraph) -> Result<Vec<u8>, DataError> {
    let encoded = bincode::serialize(graph)?;
    zstd::stream::encode_all(Cursor::new(encoded), GRAPH_COMPRESSION_LEVEL).map_err(DataError::Compression)
}

pub fn deserialize_graph(bytes: &[u8]) -> Result<VisibilityGraph, DataError> {
    let decoded = zstd::stream::decode_all(Cursor::new(bytes)).map_err(DataError::Compression)?;
    let mut graph: VisibilityGraph = bincode::deserialize(&decoded)?;
    graph.rebuild_indices();
    Ok(graph)
}

pub fn write_graph_to_file<P: AsRef<Path>>(graph: &VisibilityGraph, path: P) -> Result<(), DataError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serialize_graph(graph)?)?;
    Ok(())
}

pub fn read_graph_from_file<P: AsRef<Path>>(path: P) -> Result<VisibilityGraph, DataError> {
    let path = path.as_ref();
    let graph = deserialize_graph(&fs::read(path)?)?;
    info!(
        "Loaded visibility graph from {} ({} nodes, {} edges)",
        path.display(),
        graph.len(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Loads the bundle named by [`GRAPH_PATH_ENV`], or [`DEFAULT_GRAPH_PATH`].
/// A missing or unreadable bundle is logged and yields `None`.
pub fn load_graph_bundle() -> Option<VisibilityGraph> {
    let path = std::env::var(GRAPH_PATH_ENV).unwrap_or_else(|_| DEFAULT_GRAPH_PATH.to_owned());
    match read_graph_from_file(&path) {
        Ok(graph) => Some(graph),
        Err(err) => {
            warn!("No prebuilt graph at {path}: {err}");
            None
        }
    }
}
