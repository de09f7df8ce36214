use std::cmp::Ordering;
use std::sync::Arc;

/// Position of a node inside the campus node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

/// Undirected edge record before it is folded into the adjacency lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub from: NodeIndex,
    pub to: NodeIndex,
    /// Walking distance along the corridor, in meters.
    pub distance: f64,
}

/// Edge within the routing graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeIndex,
    pub distance: f64,
}

/// Adjacency lists indexed by [`NodeIndex`].
///
/// Corridors are walkable in both directions, so every record produces a pair
/// of edges. Parallel records between the same two nodes collapse into the
/// cheapest one.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: Arc<Vec<Vec<Edge>>>,
}

impl Graph {
    /// Build the adjacency lists for `node_count` nodes.
    ///
    /// Records pointing outside the arena, self-loops and negative or
    /// non-finite distances are dropped.
    pub fn build(node_count: usize, records: impl IntoIterator<Item = EdgeRecord>) -> Self {
        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); node_count];

        for record in records {
            if record.from.0 >= node_count
                || record.to.0 >= node_count
                || record.from == record.to
                || !record.distance.is_finite()
                || record.distance < 0.0
            {
                continue;
            }
            insert_edge(&mut adjacency[record.from.0], record.to, record.distance);
            insert_edge(&mut adjacency[record.to.0], record.from, record.distance);
        }

        for edges in &mut adjacency {
            edges.sort_by(|a, b| {
                compare_distance(a.distance, b.distance).then_with(|| a.target.cmp(&b.target))
            });
        }

        Self {
            adjacency: Arc::new(adjacency),
        }
    }

    /// Number of nodes covered by the adjacency lists.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Return the neighbours for a given node.
    pub fn neighbours(&self, node: NodeIndex) -> &[Edge] {
        self.adjacency
            .get(node.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }
}

fn insert_edge(edges: &mut Vec<Edge>, target: NodeIndex, distance: f64) {
    if let Some(existing) = edges.iter_mut().find(|edge| edge.target == target) {
        if distance < existing.distance {
            existing.distance = distance;
        }
        return;
    }
    edges.push(Edge { target, distance });
}

fn compare_distance(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: usize, to: usize, distance: f64) -> EdgeRecord {
        EdgeRecord {
            from: NodeIndex(from),
            to: NodeIndex(to),
            distance,
        }
    }

    #[test]
    fn edges_are_bidirectional() {
        let graph = Graph::build(2, [record(0, 1, 12.5)]);
        assert_eq!(graph.neighbours(NodeIndex(0))[0].target, NodeIndex(1));
        assert_eq!(graph.neighbours(NodeIndex(1))[0].target, NodeIndex(0));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn parallel_edges_keep_cheapest() {
        let graph = Graph::build(2, [record(0, 1, 30.0), record(1, 0, 20.0)]);
        let edges = graph.neighbours(NodeIndex(0));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].distance, 20.0);
    }

    #[test]
    fn invalid_records_are_dropped() {
        let graph = Graph::build(
            2,
            [
                record(0, 5, 1.0),
                record(0, 0, 1.0),
                record(0, 1, f64::NAN),
                record(0, 1, -3.0),
            ],
        );
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbours(NodeIndex(9)).is_empty());
    }

    #[test]
    fn neighbours_sorted_by_distance() {
        let graph = Graph::build(3, [record(0, 2, 50.0), record(0, 1, 10.0)]);
        let targets: Vec<_> = graph
            .neighbours(NodeIndex(0))
            .iter()
            .map(|edge| edge.target)
            .collect();
        assert_eq!(targets, vec![NodeIndex(1), NodeIndex(2)]);
    }
}
