pub mod config;
pub mod data;
pub mod flight;
pub mod geometry;
pub mod graph;
pub mod mission;
pub mod spatial;

use std::fmt;
use std::hash::{Hash, Hasher};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::geometry::direction::Direction;
use crate::geometry::GeometryError;

/// Distance covered by a single non-hover move, in coordinate units.
pub const STEP_LENGTH: f64 = 0.00015;

/// Round-off allowance added to the arrival threshold.
pub const CLOSE_TOLERANCE: f64 = 1e-12;

pub const DEPOT_LNG: f64 = -3.186874;
pub const DEPOT_LAT: f64 = 55.944494;

/// A position on the map.
///
/// Equality and hashing are bitwise on both coordinates, so two points are the
/// same graph node only if they were produced by the exact same arithmetic.
/// Use [`LngLat::close_to`] for "have we arrived" checks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LngLat {
    #[serde(rename = "longitude")]
    pub lng: f64,
    #[serde(rename = "latitude")]
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        LngLat { lng, lat }
    }

    pub const fn depot() -> Self {
        LngLat::new(DEPOT_LNG, DEPOT_LAT)
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// Rejects NaN and infinite coordinates.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(GeometryError::NonFinite {
                lng: self.lng,
                lat: self.lat,
            })
        }
    }

    pub fn distance_to(&self, other: &LngLat) -> f64 {
        let dx = self.lng - other.lng;
        let dy = self.lat - other.lat;
        (dx * dx + dy * dy).sqrt()
    }

    /// Like [`LngLat::distance_to`], but fails instead of returning NaN or
    /// infinity when either point is invalid.
    pub fn try_distance_to(&self, other: &LngLat) -> Result<f64, GeometryError> {
        self.validate()?;
        other.validate()?;
        Ok(self.distance_to(other))
    }

    /// True when `other` is less than one step plus [`CLOSE_TOLERANCE`] away,
    /// so a point exactly one step away has been reached.
    pub fn close_to(&self, other: &LngLat) -> bool {
        self.distance_to(other) < STEP_LENGTH + CLOSE_TOLERANCE
    }

    /// Position after one move; `None` hovers in place.
    pub fn next_position(&self, direction: Option<Direction>) -> LngLat {
        match direction {
            None => *self,
            Some(d) => {
                let rad = d.radians();
                LngLat::new(
                    self.lng + STEP_LENGTH * rad.cos(),
                    self.lat + STEP_LENGTH * rad.sin(),
                )
            }
        }
    }

    /// Point `t` of the way along `p -> q`.
    ///
    /// `t == 0` and `t == 1` return the endpoints exactly. Fractions outside
    /// `[0, 1]` are logged and extrapolated.
    ///
    /// Uses the affine form `p + (q - p) * t`, not `(p + q) * t`, which only
    /// lands on the segment at `t == 0.5`.
    pub fn interpolate(p: &LngLat, q: &LngLat, t: f64) -> LngLat {
        if t == 0.0 {
            return *p;
        }
        if t == 1.0 {
            return *q;
        }
        if !(0.0..=1.0).contains(&t) {
            warn!("interpolation fraction {t} is outside [0, 1]");
        }
        LngLat::new(p.lng + (q.lng - p.lng) * t, p.lat + (q.lat - p.lat) * t)
    }
}

impl PartialEq for LngLat {
    fn eq(&self, other: &Self) -> bool {
        self.lng.to_bits() == other.lng.to_bits() && self.lat.to_bits() == other.lat.to_bits()
    }
}

impl Eq for LngLat {}

impl Hash for LngLat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lng.to_bits().hash(state);
        self.lat.to_bits().hash(state);
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lng, self.lat)
    }
}
