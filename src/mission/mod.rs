pub mod dispatch;

use thiserror::Error;

use crate::flight::FlightError;
use crate::geometry::GeometryError;
use crate::graph::GraphError;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("failed to build visibility graph: {0}")]
    Graph(#[from] GraphError),
    #[error("flight simulation failed for order {order_no}: {source}")]
    Flight {
        order_no: String,
        #[source]
        source: FlightError,
    },
}
