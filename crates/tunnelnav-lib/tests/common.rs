//! Fixture helpers shared by the integration tests.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tunnelnav_lib::CampusData;

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

#[allow(dead_code)]
pub fn campus_fixture() -> PathBuf {
    fixtures_dir().join("campus.json")
}

/// Write the JSON fixture's contents into a SQLite database at `path`.
///
/// `floor` is stored as an integer to exercise the loader's text coercion.
#[allow(dead_code)]
pub fn write_sqlite_campus(path: &Path) {
    let json = std::fs::read_to_string(campus_fixture()).expect("read campus fixture");
    let data: CampusData = serde_json::from_str(&json).expect("parse campus fixture");

    let conn = Connection::open(path).expect("create sqlite campus");
    conn.execute_batch(
        "CREATE TABLE buildings (name TEXT PRIMARY KEY, latitude REAL, longitude REAL, disconnected INTEGER);
         CREATE TABLE nodes (id INTEGER PRIMARY KEY, building_name TEXT, latitude REAL, longitude REAL, floor INTEGER, node_type TEXT);
         CREATE TABLE edges (from_id INTEGER, to_id INTEGER, distance REAL);",
    )
    .expect("create tables");

    for building in &data.buildings {
        conn.execute(
            "INSERT INTO buildings VALUES (?1, ?2, ?3, ?4)",
            params![
                building.name,
                building.latitude,
                building.longitude,
                building.disconnected as i64
            ],
        )
        .expect("insert building");
    }
    for node in &data.nodes {
        let floor: i64 = node.floor.parse().expect("numeric floor in fixture");
        conn.execute(
            "INSERT INTO nodes VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                node.id,
                node.building_name,
                node.latitude,
                node.longitude,
                floor,
                node.node_type
            ],
        )
        .expect("insert node");
    }
    for edge in &data.edges {
        conn.execute(
            "INSERT INTO edges VALUES (?1, ?2, ?3)",
            params![edge.from, edge.to, edge.distance],
        )
        .expect("insert edge");
    }
}
