pub mod graph;
pub mod pathfinder;

use thiserror::Error;

use crate::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("a visibility graph needs at least one destination")]
    NoDestinations,
}
