use crate::graph::graph::VisibilityGraph;
use crate::LngLat;
use log::warn;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Clone, Debug)]
pub struct PathStep {
    pub node_index: usize,
    pub cost: f64,
}

/// A* over the visibility graph with straight-line distance as the heuristic.
/// Cost model: edge weight is the Euclidean length of the edge.
///
/// Cost and predecessor tables are allocated per call, so the graph is never
/// mutated. Returns `None` when the goal cannot be reached or either index is
/// not a node of `graph`.
pub fn shortest_path(graph: &VisibilityGraph, start: usize, goal: usize) -> Option<Vec<PathStep>> {
    if start >= graph.len() || goal >= graph.len() {
        warn!("Node index out of range: {start} -> {goal} in a graph of {}", graph.len());
        return None;
    }
    if start == goal {
        return Some(vec![PathStep {
            node_index: start,
            cost: 0.0,
        }]);
    }

    #[derive(Copy, Clone, Debug)]
    struct Node {
        idx: usize,
        f_score: f64,
    }

    impl Eq for Node {}

    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            self.f_score.eq(&other.f_score)
        }
    }

    impl Ord for Node {
        fn cmp(&self, other: &Self) -> Ordering {
            other
                .f_score
                .partial_cmp(&self.f_score)
                .unwrap_or(Ordering::Equal)
        }
    }

    impl PartialOrd for Node {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let n = graph.len();
    let mut g_score = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];

    let mut open = BinaryHeap::new();
    g_score[start] = 0.0;
    open.push(Node {
        idx: start,
        f_score: heuristic(graph, start, goal),
    });

    while let Some(Node { idx: current, .. }) = open.pop() {
        if current == goal {
            return Some(reconstruct_path(&came_from, &g_score, current));
        }
        // stale heap entry
        if closed[current] {
            continue;
        }
        closed[current] = true;

        let current_g = g_score[current];
        for edge in &graph.edges[current] {
            let tentative_g = current_g + edge.weight;
            if tentative_g < g_score[edge.to] {
                came_from[edge.to] = Some(current);
                g_score[edge.to] = tentative_g;
                open.push(Node {
                    idx: edge.to,
                    f_score: tentative_g + heuristic(graph, edge.to, goal),
                });
            }
        }
    }

    None
}

/// Waypoints from `start` to `destination`, both included.
///
/// Identical endpoints give an empty list without searching. Points that are
/// not graph nodes are logged and treated as unreachable.
pub fn find_waypoints(
    graph: &VisibilityGraph,
    start: &LngLat,
    destination: &LngLat,
) -> Option<Vec<LngLat>> {
    if start == destination {
        return Some(Vec::new());
    }

    let (Some(from), Some(to)) = (graph.index_of(start), graph.index_of(destination)) else {
        warn!("Cannot route {start} -> {destination}: endpoint is not a graph node");
        return None;
    };

    match shortest_path(graph, from, to) {
        Some(path) => Some(path.iter().map(|step| graph.nodes[step.node_index]).collect()),
        None => {
            warn!("No path from {start} to {destination}");
            None
        }
    }
}

fn heuristic(graph: &VisibilityGraph, from: usize, to: usize) -> f64 {
    graph.nodes[from].distance_to(&graph.nodes[to])
}

fn reconstruct_path(came_from: &[Option<usize>], g_score: &[f64], mut current: usize) -> Vec<PathStep> {
    let mut total_path = vec![current];
    while let Some(prev) = came_from[current] {
        current = prev;
        total_path.push(current);
    }
    total_path.reverse();

    total_path
        .into_iter()
        .map(|idx| PathStep {
            node_index: idx,
            cost: g_score[idx],
        })
        .collect()
}
