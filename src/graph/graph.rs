use std::collections::HashMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::graph::GraphError;
use crate::spatial::polygon::{Boundary, Polygon};
use crate::LngLat;

/// Fractions along an edge that are sampled for zone containment.
const SAMPLE_FRACTIONS: [f64; 3] = [0.25, 0.5, 0.75];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Visibility graph over the depot, the destinations and every no-fly zone
/// vertex.
///
/// Nodes live in an arena addressed by index; the graph itself holds no search
/// state, so it can be queried any number of times, from any number of
/// threads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisibilityGraph {
    pub nodes: Vec<LngLat>,
    /// edges[i] lists the visible edges leaving nodes[i]
    pub edges: Vec<Vec<Edge>>,
    #[serde(skip)]
    point_index: HashMap<LngLat, usize>,
}

impl VisibilityGraph {
    /// Builds the complete graph over all points, then drops every edge that
    /// cuts through a zone.
    pub fn build(
        depot: LngLat,
        destinations: &[LngLat],
        no_fly_zones: &[Polygon],
    ) -> Result<Self, GraphError> {
        if destinations.is_empty() {
            return Err(GraphError::NoDestinations);
        }

        let mut graph = VisibilityGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            point_index: HashMap::new(),
        };

        let zone_vertices = no_fly_zones.iter().flat_map(|z| z.vertices().iter());
        for point in std::iter::once(&depot)
            .chain(destinations.iter())
            .chain(zone_vertices)
        {
            point.validate()?;
            if !graph.point_index.contains_key(point) {
                graph.point_index.insert(*point, graph.nodes.len());
                graph.nodes.push(*point);
            }
        }

        let n = graph.nodes.len();
        let mut kept = 0usize;
        let mut pruned = 0usize;
        graph.edges = (0..n)
            .map(|from| {
                let start = graph.nodes[from];
                (0..n)
                    .filter(|&to| to != from)
                    .filter_map(|to| {
                        let end = graph.nodes[to];
                        if is_visible(&start, &end, no_fly_zones) {
                            kept += 1;
                            Some(Edge {
                                from,
                                to,
                                weight: start.distance_to(&end),
                            })
                        } else {
                            pruned += 1;
                            None
                        }
                    })
                    .collect()
            })
            .collect();

        info!(
            "Built visibility graph with {} nodes, {} edges ({} pruned by {} no-fly zones)",
            n,
            kept,
            pruned,
            no_fly_zones.len()
        );
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    pub fn index_of(&self, point: &LngLat) -> Option<usize> {
        self.point_index.get(point).copied()
    }

    pub fn contains(&self, point: &LngLat) -> bool {
        self.point_index.contains_key(point)
    }

    /// Edges leaving `point`; empty, with a warning, if the point is not a node.
    pub fn edges_from(&self, point: &LngLat) -> &[Edge] {
        match self.index_of(point) {
            Some(idx) => &self.edges[idx],
            None => {
                warn!("No graph node at {point}");
                &[]
            }
        }
    }

    pub fn rebuild_indices(&mut self) {
        self.point_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, point)| (*point, idx))
            .collect();
    }
}

/// Sampled visibility test: the segment must not strictly cross any zone edge
/// and none of the sample points may lie inside a zone.
///
/// Probing only three interior points is an approximation; a segment can still
/// clip a non-convex zone between samples.
fn is_visible(start: &LngLat, end: &LngLat, no_fly_zones: &[Polygon]) -> bool {
    if no_fly_zones.is_empty() {
        return true;
    }
    let samples = SAMPLE_FRACTIONS.map(|t| LngLat::interpolate(start, end, t));
    !no_fly_zones.iter().any(|zone| {
        zone.is_crossed_by(start, end)
            || samples
                .iter()
                .any(|sample| zone.contains(sample, Boundary::Exclusive))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Polygon {
        Polygon::new(vec![
            LngLat::new(min, min),
            LngLat::new(min, max),
            LngLat::new(max, max),
            LngLat::new(max, min),
        ])
        .expect("square")
    }

    #[test]
    fn complete_graph_without_zones() {
        let depot = LngLat::new(0.0, 0.0);
        let dests = [LngLat::new(1.0, 0.0), LngLat::new(0.0, 1.0)];
        let graph = VisibilityGraph::build(depot, &dests, &[]).expect("graph");
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 6);
        let from_depot = graph.edges_from(&depot);
        assert_eq!(from_depot.len(), 2);
        assert!((from_depot[0].weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn duplicate_points_share_a_node() {
        let depot = LngLat::new(0.0, 0.0);
        let dests = [LngLat::new(1.0, 0.0), LngLat::new(1.0, 0.0), depot];
        let graph = VisibilityGraph::build(depot, &dests, &[]).expect("graph");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.index_of(&depot), Some(0));
    }

    #[test]
    fn edges_through_a_zone_are_pruned() {
        let depot = LngLat::new(-1.0, 0.5);
        let dest = LngLat::new(2.0, 0.5);
        let zone = square(0.0, 1.0);
        let graph = VisibilityGraph::build(depot, &[dest], &[zone]).expect("graph");
        assert_eq!(graph.len(), 6);

        let d = graph.index_of(&dest).expect("dest node");
        assert!(graph.edges_from(&depot).iter().all(|e| e.to != d));

        // The square's diagonal touches only vertices, so only the
        // interior samples can reject it.
        let corner = LngLat::new(0.0, 0.0);
        let opposite = graph.index_of(&LngLat::new(1.0, 1.0)).expect("corner");
        assert!(graph.edges_from(&corner).iter().all(|e| e.to != opposite));

        // Travelling along the bottom boundary is allowed.
        let along = graph.index_of(&LngLat::new(1.0, 0.0)).expect("corner");
        assert!(graph.edges_from(&corner).iter().any(|e| e.to == along));
    }

    #[test]
    fn unknown_point_has_no_edges() {
        let graph =
            VisibilityGraph::build(LngLat::new(0.0, 0.0), &[LngLat::new(1.0, 1.0)], &[])
                .expect("graph");
        assert!(graph.edges_from(&LngLat::new(5.0, 5.0)).is_empty());
        assert!(!graph.contains(&LngLat::new(5.0, 5.0)));
    }

    #[test]
    fn build_requires_destinations_and_finite_points() {
        let depot = LngLat::new(0.0, 0.0);
        assert!(matches!(
            VisibilityGraph::build(depot, &[], &[]),
            Err(GraphError::NoDestinations)
        ));
        assert!(matches!(
            VisibilityGraph::build(depot, &[LngLat::new(f64::INFINITY, 0.0)], &[]),
            Err(GraphError::Geometry(_))
        ));
    }
}
