pub mod direction;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("point ({lng}, {lat}) has a non-finite coordinate")]
    NonFinite { lng: f64, lat: f64 },
    #[error("a polygon must have at least three vertices, found {found}")]
    TooFewVertices { found: usize },
    #[error("no compass direction has an angle of {0} degrees")]
    UnknownAngle(f64),
}
