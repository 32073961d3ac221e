use serde::{Deserialize, Serialize};

use crate::geometry::GeometryError;
use crate::LngLat;

/// Longitude used as the far end of the containment ray; beyond any real
/// longitude.
const RAY_LNG: f64 = 181.0;

/// Turn direction of `c` relative to the directed line `a -> b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    CounterClockwise,
    Clockwise,
}

pub fn orientation(a: &LngLat, b: &LngLat, c: &LngLat) -> Orientation {
    let cross = (b.lat - a.lat) * (c.lng - b.lng) - (c.lat - b.lat) * (b.lng - a.lng);
    if cross == 0.0 {
        Orientation::Collinear
    } else if cross < 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Bounding-box test; only meaningful once `c` is known to be collinear with
/// `a -> b`.
fn on_segment(a: &LngLat, b: &LngLat, c: &LngLat) -> bool {
    c.lng <= a.lng.max(b.lng)
        && c.lng >= a.lng.min(b.lng)
        && c.lat <= a.lat.max(b.lat)
        && c.lat >= a.lat.min(b.lat)
}

/// Segments `p1 -> p2` and `q1 -> q2` cross or touch.
pub fn segments_intersect(p1: &LngLat, p2: &LngLat, q1: &LngLat, q2: &LngLat) -> bool {
    let d1 = orientation(p1, p2, q1);
    let d2 = orientation(p1, p2, q2);
    let d3 = orientation(q1, q2, p1);
    let d4 = orientation(q1, q2, p2);

    if d1 != d2 && d3 != d4 {
        return true;
    }

    (d1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (d2 == Orientation::Collinear && on_segment(p1, p2, q2))
        || (d3 == Orientation::Collinear && on_segment(q1, q2, p1))
        || (d4 == Orientation::Collinear && on_segment(q1, q2, p2))
}

/// Segments cross transversally. Shared endpoints and any collinear contact
/// do not count, so travelling along a boundary is allowed.
pub fn segments_cross_strictly(p1: &LngLat, p2: &LngLat, q1: &LngLat, q2: &LngLat) -> bool {
    if p1 == q1 || p1 == q2 || p2 == q1 || p2 == q2 {
        return false;
    }

    let d1 = orientation(p1, p2, q1);
    let d2 = orientation(p1, p2, q2);
    let d3 = orientation(q1, q2, p1);
    let d4 = orientation(q1, q2, p2);

    if [d1, d2, d3, d4].contains(&Orientation::Collinear) {
        return false;
    }

    d1 != d2 && d3 != d4
}

/// How points lying exactly on a polygon edge are classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Points on an edge are inside.
    Inclusive,
    /// Edge contact is not counted as a crossing, so points on an edge
    /// usually test as outside.
    Exclusive,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawPolygon", into = "RawPolygon")]
pub struct Polygon {
    name: Option<String>,
    vertices: Vec<LngLat>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawPolygon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    coordinates: Vec<[f64; 2]>,
}

impl TryFrom<RawPolygon> for Polygon {
    type Error = GeometryError;

    fn try_from(raw: RawPolygon) -> Result<Self, Self::Error> {
        let vertices = raw
            .coordinates
            .into_iter()
            .map(|[lng, lat]| LngLat::new(lng, lat))
            .collect();
        let polygon = Polygon::new(vertices)?;
        Ok(match raw.name {
            Some(name) => polygon.with_name(name),
            None => polygon,
        })
    }
}

impl From<Polygon> for RawPolygon {
    fn from(polygon: Polygon) -> Self {
        RawPolygon {
            name: polygon.name,
            coordinates: polygon.vertices.iter().map(|v| [v.lng, v.lat]).collect(),
        }
    }
}

impl Polygon {
    /// Builds a polygon from its vertices in order, without a repeated
    /// closing vertex.
    pub fn new(vertices: Vec<LngLat>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices {
                found: vertices.len(),
            });
        }
        for v in &vertices {
            v.validate()?;
        }
        Ok(Polygon {
            name: None,
            vertices,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn vertices(&self) -> &[LngLat] {
        &self.vertices
    }

    /// Edges in order, the last one closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (&LngLat, &LngLat)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Segment `a -> b` strictly crosses some edge of the polygon.
    pub fn is_crossed_by(&self, a: &LngLat, b: &LngLat) -> bool {
        self.edges()
            .any(|(v1, v2)| segments_cross_strictly(a, b, v1, v2))
    }

    /// Ray-cast containment test with a ray running due east from `p`.
    pub fn contains(&self, p: &LngLat, boundary: Boundary) -> bool {
        let far = LngLat::new(RAY_LNG, p.lat);
        let mut crossings = 0usize;

        for (v1, v2) in self.edges() {
            match boundary {
                Boundary::Exclusive => {
                    if segments_cross_strictly(v1, v2, p, &far) {
                        crossings += 1;
                    }
                }
                Boundary::Inclusive => {
                    if segments_intersect(v1, v2, p, &far) {
                        if orientation(v1, v2, p) == Orientation::Collinear {
                            return on_segment(v1, v2, p);
                        }
                        crossings += 1;
                    }
                }
            }
        }

        crossings % 2 == 1
    }
}
