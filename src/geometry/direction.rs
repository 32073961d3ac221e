use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryError;

/// Angle between neighbouring compass directions, in degrees.
pub const ANGLE_SPACING: f64 = 22.5;

/// The sixteen compass directions a drone may fly in.
///
/// The discriminant is the index into [`Direction::ALL`]; east is 0 and
/// indices increase counter-clockwise in 22.5 degree steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    E = 0,
    ENE,
    NE,
    NNE,
    N,
    NNW,
    NW,
    WNW,
    W,
    WSW,
    SW,
    SSW,
    S,
    SSE,
    SE,
    ESE,
}

impl Direction {
    pub const COUNT: usize = 16;

    pub const ALL: [Direction; Direction::COUNT] = [
        Direction::E,
        Direction::ENE,
        Direction::NE,
        Direction::NNE,
        Direction::N,
        Direction::NNW,
        Direction::NW,
        Direction::WNW,
        Direction::W,
        Direction::WSW,
        Direction::SW,
        Direction::SSW,
        Direction::S,
        Direction::SSE,
        Direction::SE,
        Direction::ESE,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Direction {
        Direction::ALL[index % Direction::COUNT]
    }

    pub fn degrees(self) -> f64 {
        self.index() as f64 * ANGLE_SPACING
    }

    pub fn radians(self) -> f64 {
        self.degrees().to_radians()
    }

    pub fn opposite(self) -> Direction {
        Direction::from_index(self.index() + Direction::COUNT / 2)
    }

    /// Exact lookup of a direction by its angle in degrees.
    ///
    /// Any angle that is not one of the sixteen table values is an error; the
    /// stepper never produces such an angle, so hitting this means some input
    /// was corrupted upstream.
    pub fn from_degrees(angle: f64) -> Result<Direction, GeometryError> {
        Direction::ALL
            .iter()
            .copied()
            .find(|d| d.degrees() == angle)
            .ok_or(GeometryError::UnknownAngle(angle))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
