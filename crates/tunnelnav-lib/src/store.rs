//! Graph store contract consumed by the route composer.
//!
//! [`Campus`](crate::Campus) is the in-process implementation; the trait keeps
//! the composer independent of where the indoor network actually lives.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::Coordinates;

/// Node type of indoor nodes that double as building entrances/exits.
pub const BUILDING_NODE_TYPE: &str = "building_node";

/// Node type of elevator nodes.
pub const ELEVATOR_NODE_TYPE: &str = "elevator";

/// A point in the indoor graph or a building centroid.
///
/// `id` is the store's opaque identifier and is only ever round-tripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingNode {
    pub id: String,
    pub building_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl BuildingNode {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Node on an indoor path, with the metadata needed for turn instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub node: BuildingNode,
    pub floor: String,
    pub node_type: String,
}

impl PathNode {
    pub fn is_elevator(&self) -> bool {
        self.node_type == ELEVATOR_NODE_TYPE
    }
}

/// Ordered node path between two buildings plus its weight in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct IndoorPath {
    pub nodes: Vec<PathNode>,
    pub weight_meters: f64,
}

/// Operations the route composer needs from the indoor graph.
///
/// Methods return [`Result`] so remote implementations can report outages;
/// such errors are fatal to the request.
pub trait GraphStore: Send + Sync {
    /// Canonical spelling of a building name, or `None` when it is unknown.
    fn resolve_building(&self, name: &str) -> Result<Option<String>>;

    /// Whether any building matches `name`.
    fn node_exists(&self, name: &str) -> Result<bool> {
        Ok(self.resolve_building(name)?.is_some())
    }

    /// Whether `name` is only reachable by walking outside from the network.
    fn is_disconnected(&self, name: &str) -> Result<bool>;

    /// Centroid (or entrance) coordinates of a building.
    fn building_coordinates(&self, name: &str) -> Result<Option<Coordinates>>;

    /// The building's own boundary node(s) followed by every boundary node
    /// reachable from them within `max_hops` edges.
    fn connected_nodes(&self, name: &str, max_hops: usize) -> Result<Vec<BuildingNode>>;

    /// Every boundary node on campus.
    fn all_boundary_nodes(&self) -> Result<Vec<BuildingNode>>;

    /// Shortest indoor path between the boundary nodes of two buildings.
    fn shortest_path(&self, start: &str, end: &str) -> Result<Option<IndoorPath>>;

    /// Names similar to `name`, used to enrich "unknown building" errors.
    fn suggest_buildings(&self, _name: &str, _limit: usize) -> Vec<String> {
        Vec::new()
    }
}
