use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use crate::graph::{Graph, NodeIndex};

/// Node sequence and accumulated edge weight of a found path.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundPath {
    pub nodes: Vec<NodeIndex>,
    /// Sum of traversed edge distances, in meters.
    pub cost: f64,
}

/// Run A* search between `start` and `goal`.
///
/// `heuristic` estimates the remaining distance from a node to `goal` and must
/// not overestimate it for the result to be optimal; crow-flies distance
/// qualifies as long as corridor lengths are never shorter than the straight
/// line between their endpoints.
pub fn find_route_a_star(
    graph: &Graph,
    start: NodeIndex,
    goal: NodeIndex,
    heuristic: impl Fn(NodeIndex) -> f64,
) -> Option<FoundPath> {
    if start.0 >= graph.len() || goal.0 >= graph.len() {
        return None;
    }
    if start == goal {
        return Some(FoundPath {
            nodes: vec![start],
            cost: 0.0,
        });
    }

    let mut g_score: HashMap<NodeIndex, f64> = HashMap::new();
    let mut parents: HashMap<NodeIndex, Option<NodeIndex>> = HashMap::new();
    let mut queue = BinaryHeap::new();

    g_score.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(AStarEntry::new(start, 0.0, heuristic(start)));

    while let Some(entry) = queue.pop() {
        let current_score = match g_score.get(&entry.node) {
            Some(score) if *score < entry.cost.0 => continue,
            Some(score) => *score,
            None => continue,
        };

        if entry.node == goal {
            return Some(FoundPath {
                nodes: reconstruct_path(&parents, start, goal),
                cost: current_score,
            });
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            let tentative_g = current_score + edge.distance;
            if tentative_g < *g_score.get(&next).unwrap_or(&f64::INFINITY) {
                g_score.insert(next, tentative_g);
                parents.insert(next, Some(entry.node));
                queue.push(AStarEntry::new(next, tentative_g, heuristic(next)));
            }
        }
    }

    None
}

/// Breadth-first walk from `start` that stops expanding after `max_hops`.
///
/// Returns every reached node (including `start`) with its hop count, in
/// visiting order.
pub fn reachable_within(
    graph: &Graph,
    start: NodeIndex,
    max_hops: usize,
) -> Vec<(NodeIndex, usize)> {
    if start.0 >= graph.len() {
        return Vec::new();
    }

    let mut hops: HashMap<NodeIndex, usize> = HashMap::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    hops.insert(start, 0);
    order.push((start, 0));
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let depth = hops[&current];
        if depth >= max_hops {
            continue;
        }
        for edge in graph.neighbours(current) {
            let next = edge.target;
            if hops.contains_key(&next) {
                continue;
            }
            hops.insert(next, depth + 1);
            order.push((next, depth + 1));
            queue.push_back(next);
        }
    }

    order
}

fn reconstruct_path(
    parents: &HashMap<NodeIndex, Option<NodeIndex>>,
    start: NodeIndex,
    goal: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: NodeIndex,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: NodeIndex, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeRecord;

    fn graph(node_count: usize, edges: &[(usize, usize, f64)]) -> Graph {
        Graph::build(
            node_count,
            edges.iter().map(|&(from, to, distance)| EdgeRecord {
                from: NodeIndex(from),
                to: NodeIndex(to),
                distance,
            }),
        )
    }

    #[test]
    fn a_star_prefers_cheaper_detour() {
        // 0 -> 3 directly costs 100, via 1 and 2 only 30.
        let g = graph(4, &[(0, 3, 100.0), (0, 1, 10.0), (1, 2, 10.0), (2, 3, 10.0)]);
        let found = find_route_a_star(&g, NodeIndex(0), NodeIndex(3), |_| 0.0).expect("path");
        assert_eq!(
            found.nodes,
            vec![NodeIndex(0), NodeIndex(1), NodeIndex(2), NodeIndex(3)]
        );
        assert!((found.cost - 30.0).abs() < 1e-9);
    }

    #[test]
    fn a_star_reports_missing_path() {
        let g = graph(3, &[(0, 1, 5.0)]);
        assert!(find_route_a_star(&g, NodeIndex(0), NodeIndex(2), |_| 0.0).is_none());
        assert!(find_route_a_star(&g, NodeIndex(0), NodeIndex(7), |_| 0.0).is_none());
    }

    #[test]
    fn a_star_same_node_is_trivial() {
        let g = graph(1, &[]);
        let found = find_route_a_star(&g, NodeIndex(0), NodeIndex(0), |_| 0.0).expect("path");
        assert_eq!(found.nodes, vec![NodeIndex(0)]);
        assert_eq!(found.cost, 0.0);
    }

    #[test]
    fn reachable_within_respects_hop_ceiling() {
        let g = graph(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
        let reached: Vec<_> = reachable_within(&g, NodeIndex(0), 2)
            .into_iter()
            .map(|(node, _)| node)
            .collect();
        assert_eq!(reached, vec![NodeIndex(0), NodeIndex(1), NodeIndex(2)]);
    }

    #[test]
    fn reachable_within_reports_hop_counts() {
        let g = graph(3, &[(0, 1, 1.0), (0, 2, 1.0), (1, 2, 1.0)]);
        let reached = reachable_within(&g, NodeIndex(0), 10);
        assert_eq!(reached.len(), 3);
        assert!(reached.iter().all(|&(node, hops)| node == NodeIndex(0) || hops == 1));
    }
}
