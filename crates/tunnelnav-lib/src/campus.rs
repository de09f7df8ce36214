//! In-memory campus network: buildings, indoor nodes and corridors.
//!
//! [`load_campus`] accepts either a SQLite database or a JSON document with
//! the same three collections. Both are funnelled through [`CampusData`] and
//! [`Campus::from_data`], which validates references and builds the node
//! arena and adjacency lists used by pathfinding.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{self, Coordinates};
use crate::graph::{EdgeRecord, Graph, NodeIndex};
use crate::path::{find_route_a_star, reachable_within};
use crate::store::{BuildingNode, GraphStore, IndoorPath, PathNode, BUILDING_NODE_TYPE};

/// Opaque identifier for an indoor node as stored in the source data.
pub type NodeId = i64;

const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Default number of results returned by [`Campus::search_buildings`].
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Building record as stored in the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// `true` for buildings that are not part of the indoor network.
    #[serde(default)]
    pub disconnected: bool,
}

/// Indoor node record as stored in the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub building_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_floor")]
    pub floor: String,
    pub node_type: String,
}

/// Corridor record as stored in the source data. Corridors are undirected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorRecord {
    pub from: NodeId,
    pub to: NodeId,
    /// Walking distance in meters.
    pub distance: f64,
}

/// Raw campus collections, shared by the SQLite and JSON loaders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampusData {
    #[serde(default)]
    pub buildings: Vec<BuildingRecord>,
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<CorridorRecord>,
}

fn default_floor() -> String {
    "1".to_string()
}

/// Indoor node held in the campus arena.
#[derive(Debug, Clone, PartialEq)]
pub struct IndoorNode {
    pub id: NodeId,
    pub building_name: String,
    pub coordinates: Coordinates,
    pub floor: String,
    pub node_type: String,
}

impl IndoorNode {
    /// Whether this node is an entrance/exit of its building.
    pub fn is_building_node(&self) -> bool {
        self.node_type == BUILDING_NODE_TYPE
    }

    pub fn to_building_node(&self) -> BuildingNode {
        BuildingNode {
            id: self.id.to_string(),
            building_name: self.building_name.clone(),
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
        }
    }

    fn to_path_node(&self) -> PathNode {
        PathNode {
            node: self.to_building_node(),
            floor: self.floor.clone(),
            node_type: self.node_type.clone(),
        }
    }
}

/// Building known to the campus.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub name: String,
    pub coordinates: Option<Coordinates>,
    pub disconnected: bool,
}

/// In-memory representation of the campus network.
#[derive(Debug, Clone, Default)]
pub struct Campus {
    nodes: Vec<IndoorNode>,
    id_to_index: HashMap<NodeId, NodeIndex>,
    buildings: HashMap<String, Building>,
    lowercase_names: HashMap<String, String>,
    boundary_nodes: HashMap<String, Vec<NodeIndex>>,
    graph: Graph,
}

impl Campus {
    /// Build a campus from raw records.
    ///
    /// Duplicate node identifiers keep their first occurrence; corridors that
    /// reference unknown nodes are skipped. Building nodes whose building has
    /// no record of its own produce an implicit connected building.
    pub fn from_data(data: CampusData) -> Self {
        let mut nodes: Vec<IndoorNode> = Vec::with_capacity(data.nodes.len());
        let mut id_to_index: HashMap<NodeId, NodeIndex> = HashMap::new();
        let mut duplicate_nodes = 0usize;

        for record in data.nodes {
            if id_to_index.contains_key(&record.id) {
                duplicate_nodes += 1;
                continue;
            }
            id_to_index.insert(record.id, NodeIndex(nodes.len()));
            nodes.push(IndoorNode {
                id: record.id,
                building_name: record.building_name,
                coordinates: Coordinates::new(record.latitude, record.longitude),
                floor: record.floor,
                node_type: record.node_type,
            });
        }

        let mut skipped_edges = 0usize;
        let mut edges = Vec::with_capacity(data.edges.len());
        for corridor in &data.edges {
            match (
                id_to_index.get(&corridor.from),
                id_to_index.get(&corridor.to),
            ) {
                (Some(&from), Some(&to)) => edges.push(EdgeRecord {
                    from,
                    to,
                    distance: corridor.distance,
                }),
                _ => skipped_edges += 1,
            }
        }
        let graph = Graph::build(nodes.len(), edges);

        let mut boundary_nodes: HashMap<String, Vec<NodeIndex>> = HashMap::new();
        for (position, node) in nodes.iter().enumerate() {
            if node.is_building_node() {
                boundary_nodes
                    .entry(node.building_name.clone())
                    .or_default()
                    .push(NodeIndex(position));
            }
        }

        let mut buildings: HashMap<String, Building> = HashMap::new();
        for record in data.buildings {
            let coordinates = match (record.latitude, record.longitude) {
                (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
                _ => None,
            };
            buildings.insert(
                record.name.clone(),
                Building {
                    name: record.name,
                    coordinates,
                    disconnected: record.disconnected,
                },
            );
        }
        for (name, indices) in &boundary_nodes {
            let entrance = nodes[indices[0].0].coordinates;
            let building = buildings.entry(name.clone()).or_insert_with(|| Building {
                name: name.clone(),
                coordinates: None,
                disconnected: false,
            });
            if building.coordinates.is_none() {
                building.coordinates = Some(entrance);
            }
        }

        let lowercase_names = buildings
            .keys()
            .map(|name| (name.to_lowercase(), name.clone()))
            .collect();

        if duplicate_nodes > 0 {
            warn!(duplicate_nodes, "ignored nodes with duplicate identifiers");
        }
        if skipped_edges > 0 {
            warn!(skipped_edges, "ignored corridors referencing unknown nodes");
        }
        debug!(
            buildings = buildings.len(),
            nodes = nodes.len(),
            corridors = graph.edge_count(),
            "campus assembled"
        );

        Self {
            nodes,
            id_to_index,
            buildings,
            lowercase_names,
            boundary_nodes,
            graph,
        }
    }

    /// Number of indoor nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of known buildings (connected and disconnected).
    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn node(&self, index: NodeIndex) -> Option<&IndoorNode> {
        self.nodes.get(index.0)
    }

    /// Lookup a node by its source identifier.
    pub fn node_by_id(&self, id: NodeId) -> Option<&IndoorNode> {
        self.id_to_index.get(&id).and_then(|index| self.node(*index))
    }

    /// Lookup a building by name, exact match first, then case-insensitive.
    pub fn building(&self, name: &str) -> Option<&Building> {
        if let Some(building) = self.buildings.get(name) {
            return Some(building);
        }
        self.lowercase_names
            .get(&name.trim().to_lowercase())
            .and_then(|canonical| self.buildings.get(canonical))
    }

    /// All building names, sorted alphabetically.
    pub fn building_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buildings.keys().cloned().collect();
        names.sort();
        names
    }

    /// Case-insensitive substring search over building names.
    ///
    /// Exact matches rank first, then prefix matches, then any other hit;
    /// ties are alphabetical.
    pub fn search_buildings(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(u8, &String)> = self
            .buildings
            .keys()
            .filter_map(|name| {
                let lower = name.to_lowercase();
                if lower == needle {
                    Some((0, name))
                } else if lower.starts_with(&needle) {
                    Some((1, name))
                } else if lower.contains(&needle) {
                    Some((2, name))
                } else {
                    None
                }
            })
            .collect();

        matches.sort();
        matches
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Building names similar to `name`, best match first.
    pub fn fuzzy_building_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.trim().to_lowercase();
        let mut scored: Vec<(f64, &String)> = self
            .buildings
            .keys()
            .map(|candidate| {
                (
                    strsim::jaro_winkler(&needle, &candidate.to_lowercase()),
                    candidate,
                )
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.clone())
            .collect()
    }

    fn boundary_indices(&self, building: &str) -> &[NodeIndex] {
        self.boundary_nodes
            .get(building)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn heuristic_to(&self, goal: NodeIndex) -> impl Fn(NodeIndex) -> f64 + '_ {
        let goal_position = self.nodes[goal.0].coordinates;
        move |index: NodeIndex| geo::distance_meters(self.nodes[index.0].coordinates, goal_position)
    }
}

impl GraphStore for Campus {
    fn resolve_building(&self, name: &str) -> Result<Option<String>> {
        Ok(self.building(name).map(|building| building.name.clone()))
    }

    fn is_disconnected(&self, name: &str) -> Result<bool> {
        Ok(self
            .building(name)
            .map(|building| building.disconnected)
            .unwrap_or(false))
    }

    fn building_coordinates(&self, name: &str) -> Result<Option<Coordinates>> {
        Ok(self.building(name).and_then(|building| building.coordinates))
    }

    fn connected_nodes(&self, name: &str, max_hops: usize) -> Result<Vec<BuildingNode>> {
        let Some(building) = self.building(name) else {
            return Ok(Vec::new());
        };
        let own = self.boundary_indices(&building.name);

        let mut seen = vec![false; self.nodes.len()];
        let mut result = Vec::new();
        for &index in own {
            seen[index.0] = true;
            result.push(self.nodes[index.0].to_building_node());
        }
        for &start in own {
            for (index, _) in reachable_within(&self.graph, start, max_hops) {
                if seen[index.0] {
                    continue;
                }
                seen[index.0] = true;
                let node = &self.nodes[index.0];
                if node.is_building_node() {
                    result.push(node.to_building_node());
                }
            }
        }
        Ok(result)
    }

    fn all_boundary_nodes(&self) -> Result<Vec<BuildingNode>> {
        Ok(self
            .nodes
            .iter()
            .filter(|node| node.is_building_node())
            .map(IndoorNode::to_building_node)
            .collect())
    }

    fn shortest_path(&self, start: &str, end: &str) -> Result<Option<IndoorPath>> {
        let (Some(start_building), Some(end_building)) = (self.building(start), self.building(end))
        else {
            return Ok(None);
        };

        let mut best: Option<crate::path::FoundPath> = None;
        for &from in self.boundary_indices(&start_building.name) {
            for &to in self.boundary_indices(&end_building.name) {
                let Some(found) = find_route_a_star(&self.graph, from, to, self.heuristic_to(to))
                else {
                    continue;
                };
                if best.as_ref().map_or(true, |current| found.cost < current.cost) {
                    best = Some(found);
                }
            }
        }

        Ok(best.map(|found| IndoorPath {
            nodes: found
                .nodes
                .iter()
                .map(|index| self.nodes[index.0].to_path_node())
                .collect(),
            weight_meters: found.cost,
        }))
    }

    fn suggest_buildings(&self, name: &str, limit: usize) -> Vec<String> {
        self.fuzzy_building_matches(name, limit)
    }
}

/// Load a campus from a SQLite database or JSON document.
///
/// The format is detected from the file header: SQLite databases start with
/// the `SQLite format 3` magic, anything beginning with `{` is parsed as JSON.
pub fn load_campus(path: &Path) -> Result<Campus> {
    if !path.exists() {
        return Err(Error::CampusNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut header = [0u8; 16];
    let read = fs::File::open(path)?.read(&mut header)?;

    let data = if read == SQLITE_MAGIC.len() && &header == SQLITE_MAGIC {
        debug!(path = %path.display(), format = "sqlite", "loading campus");
        load_sqlite_data(path)?
    } else if header[..read]
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        == Some(&b'{')
    {
        debug!(path = %path.display(), format = "json", "loading campus");
        serde_json::from_slice(&fs::read(path)?)?
    } else {
        return Err(Error::UnsupportedCampusFormat {
            path: path.to_path_buf(),
        });
    };

    Ok(Campus::from_data(data))
}

/// Parse a campus from an in-memory JSON document.
pub fn campus_from_json(json: &str) -> Result<Campus> {
    let data: CampusData = serde_json::from_str(json)?;
    Ok(Campus::from_data(data))
}

fn load_sqlite_data(path: &Path) -> Result<CampusData> {
    let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    if !table_exists(&connection, "nodes")? || !table_exists(&connection, "edges")? {
        return Err(Error::UnsupportedCampusFormat {
            path: path.to_path_buf(),
        });
    }

    Ok(CampusData {
        buildings: load_buildings(&connection)?,
        nodes: load_nodes(&connection)?,
        edges: load_edges(&connection)?,
    })
}

fn load_buildings(connection: &Connection) -> Result<Vec<BuildingRecord>> {
    if !table_exists(connection, "buildings")? {
        return Ok(Vec::new());
    }

    let disconnected = if table_has_columns(connection, "buildings", &["disconnected"])? {
        "disconnected"
    } else {
        "0"
    };
    let sql = format!(
        "SELECT name, latitude, longitude, {disconnected} FROM buildings ORDER BY name"
    );

    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(BuildingRecord {
            name: row.get(0)?,
            latitude: row.get(1)?,
            longitude: row.get(2)?,
            disconnected: row.get::<_, Option<i64>>(3)?.unwrap_or(0) != 0,
        })
    })?;

    let mut buildings = Vec::new();
    for row in rows {
        buildings.push(row?);
    }
    Ok(buildings)
}

fn load_nodes(connection: &Connection) -> Result<Vec<NodeRecord>> {
    let floor = if table_has_columns(connection, "nodes", &["floor"])? {
        "CAST(floor AS TEXT)"
    } else {
        "NULL"
    };
    let sql = format!(
        "SELECT id, building_name, latitude, longitude, {floor}, node_type FROM nodes ORDER BY id"
    );

    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(NodeRecord {
            id: row.get(0)?,
            building_name: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            floor: row.get::<_, Option<String>>(4)?.unwrap_or_else(default_floor),
            node_type: row.get(5)?,
        })
    })?;

    let mut nodes = Vec::new();
    for row in rows {
        nodes.push(row?);
    }
    Ok(nodes)
}

fn load_edges(connection: &Connection) -> Result<Vec<CorridorRecord>> {
    let mut stmt = connection.prepare("SELECT from_id, to_id, distance FROM edges")?;
    let rows = stmt.query_map([], |row| {
        Ok(CorridorRecord {
            from: row.get(0)?,
            to: row.get(1)?,
            distance: row.get(2)?,
        })
    })?;

    let mut edges = Vec::new();
    for row in rows {
        edges.push(row?);
    }
    Ok(edges)
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
