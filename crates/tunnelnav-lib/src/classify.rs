//! Target classification and candidate discovery.

use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::store::{BuildingNode, GraphStore};

/// Number of "did you mean" suggestions attached to unknown-building errors.
const MAX_SUGGESTIONS: usize = 3;

/// Resolved destination building.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetClassification {
    /// Canonical building name as spelled by the store.
    pub name: String,
    pub is_disconnected: bool,
    pub coordinates: Coordinates,
}

/// Resolve `target` against the store and decide whether it is part of the
/// indoor network.
pub fn classify(store: &dyn GraphStore, target: &str) -> Result<TargetClassification> {
    let target = target.trim();
    let Some(name) = store.resolve_building(target)? else {
        return Err(Error::UnknownBuilding {
            name: target.to_string(),
            suggestions: store.suggest_buildings(target, MAX_SUGGESTIONS),
        });
    };

    let is_disconnected = store.is_disconnected(&name)?;
    let coordinates = store
        .building_coordinates(&name)?
        .ok_or_else(|| Error::MissingCoordinates { name: name.clone() })?;

    debug!(target = %name, is_disconnected, "classified target");
    Ok(TargetClassification {
        name,
        is_disconnected,
        coordinates,
    })
}

/// The target's own boundary nodes plus every boundary node within
/// `max_hops` of them.
pub fn resolve_connected_candidates(
    store: &dyn GraphStore,
    target: &str,
    max_hops: usize,
) -> Result<Vec<BuildingNode>> {
    let candidates = store.connected_nodes(target, max_hops)?;
    if candidates.is_empty() {
        return Err(Error::NoCandidates {
            target: target.to_string(),
        });
    }
    debug!(target, candidates = candidates.len(), "resolved connected candidates");
    Ok(candidates)
}

/// Every boundary node on campus, the exit pool for disconnected targets.
pub fn resolve_disconnected_candidates(
    store: &dyn GraphStore,
    target: &str,
) -> Result<Vec<BuildingNode>> {
    let candidates = store.all_boundary_nodes()?;
    if candidates.is_empty() {
        return Err(Error::NoCandidates {
            target: target.to_string(),
        });
    }
    debug!(target, candidates = candidates.len(), "resolved exit candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campus::{BuildingRecord, Campus, CampusData, NodeRecord};
    use crate::error::ErrorKind;

    fn campus() -> Campus {
        Campus::from_data(CampusData {
            buildings: vec![
                BuildingRecord {
                    name: "Pillsbury Hall".to_string(),
                    latitude: Some(44.9760),
                    longitude: Some(-93.2310),
                    disconnected: true,
                },
                BuildingRecord {
                    name: "Ghost Hall".to_string(),
                    latitude: None,
                    longitude: None,
                    disconnected: true,
                },
            ],
            nodes: vec![NodeRecord {
                id: 1,
                building_name: "Walter Library".to_string(),
                latitude: 44.9730,
                longitude: -93.2330,
                floor: "1".to_string(),
                node_type: "building_node".to_string(),
            }],
            edges: Vec::new(),
        })
    }

    #[test]
    fn classifies_connected_and_disconnected() {
        let campus = campus();
        let walter = classify(&campus, "  walter library ").unwrap();
        assert_eq!(walter.name, "Walter Library");
        assert!(!walter.is_disconnected);

        let pillsbury = classify(&campus, "Pillsbury Hall").unwrap();
        assert!(pillsbury.is_disconnected);
        assert_eq!(pillsbury.coordinates, Coordinates::new(44.9760, -93.2310));
    }

    #[test]
    fn unknown_target_carries_suggestions() {
        let err = classify(&campus(), "Walter Libary").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TargetNotFound);
        match err {
            Error::UnknownBuilding { suggestions, .. } => {
                assert_eq!(suggestions.first().map(String::as_str), Some("Walter Library"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn building_without_coordinates_is_reported() {
        let err = classify(&campus(), "Ghost Hall").unwrap_err();
        assert!(matches!(err, Error::MissingCoordinates { .. }));
    }

    #[test]
    fn empty_candidate_sets_are_no_path() {
        let empty = Campus::from_data(CampusData::default());
        let err = resolve_disconnected_candidates(&empty, "Anywhere").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoPathFound);
        let err = resolve_connected_candidates(&empty, "Anywhere", 400).unwrap_err();
        assert!(matches!(err, Error::NoCandidates { .. }));
    }
}
