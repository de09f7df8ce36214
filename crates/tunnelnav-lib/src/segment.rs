//! Outdoor and indoor segment builders.
//!
//! Both builders turn a collaborator response into [`RouteStep`]s carrying a
//! synthesized [`Instruction`]. Outdoor legs are optional: provider failures
//! are logged and surface as `None`. Indoor legs are mandatory and fail with
//! [`Error::RouteNotFound`] when the store has no path.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::directions::DirectionsProvider;
use crate::error::{Error, Result};
use crate::geo::{self, Coordinates};
use crate::store::{BuildingNode, GraphStore, PathNode};

/// Floor reported for outdoor steps.
pub const OUTDOOR_FLOOR: &str = "0";
/// Node type reported for outdoor steps.
pub const OUTDOOR_NODE_TYPE: &str = "sidewalk";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Indoor,
    Outdoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    Enter,
    Forward,
    Elevator,
    Left,
    Right,
    Final,
}

/// Maneuver that brings the user to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub label: String,
}

impl Instruction {
    pub fn new(kind: InstructionKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// A node of the final route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    #[serde(flatten)]
    pub node: BuildingNode,
    pub floor: String,
    pub node_type: String,
    pub segment_type: SegmentType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub instruction: Option<Instruction>,
}

impl RouteStep {
    pub fn coordinates(&self) -> Coordinates {
        self.node.coordinates()
    }

    fn outdoor(location: Coordinates, instruction: Instruction) -> Self {
        Self {
            node: BuildingNode {
                id: format!("{},{}", location.longitude, location.latitude),
                building_name: String::new(),
                latitude: location.latitude,
                longitude: location.longitude,
            },
            floor: OUTDOOR_FLOOR.to_string(),
            node_type: OUTDOOR_NODE_TYPE.to_string(),
            segment_type: SegmentType::Outdoor,
            instruction: Some(instruction),
        }
    }
}

/// Walking leg produced by [`OutdoorSegmentBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutdoorSegment {
    pub steps: Vec<RouteStep>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Tunnel leg produced by [`IndoorSegmentBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndoorSegment {
    pub steps: Vec<RouteStep>,
    /// Path weight reported by the graph store, in meters.
    pub weight_meters: f64,
}

/// Classify provider maneuver text by keyword.
pub fn classify_maneuver(text: &str) -> Instruction {
    let label = text.trim().trim_end_matches('.');
    let lower = text.to_lowercase();

    let kind = if lower.contains("enter") {
        InstructionKind::Enter
    } else if lower.contains("walk") || lower.contains("straight") || lower.contains("forward") {
        InstructionKind::Forward
    } else if lower.contains("arrived") || lower.contains("on your") {
        InstructionKind::Final
    } else if lower.contains("right") {
        InstructionKind::Right
    } else if lower.contains("left") {
        InstructionKind::Left
    } else {
        InstructionKind::Forward
    };

    Instruction::new(kind, label)
}

/// Wraps a [`DirectionsProvider`] call into an outdoor segment.
pub struct OutdoorSegmentBuilder<'a> {
    provider: &'a dyn DirectionsProvider,
}

impl<'a> OutdoorSegmentBuilder<'a> {
    pub fn new(provider: &'a dyn DirectionsProvider) -> Self {
        Self { provider }
    }

    /// Walk from `origin` to `destination`, ending on `final_instruction`.
    ///
    /// The provider's closing arrival step is replaced by a synthetic step at
    /// exactly `destination`. Returns `None` when the provider fails.
    pub fn build(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        final_instruction: Instruction,
    ) -> Option<OutdoorSegment> {
        let directions = match self.provider.walk(origin, destination) {
            Ok(directions) => directions,
            Err(err) => {
                warn!(error = %err, "walking directions unavailable, dropping outdoor leg");
                return None;
            }
        };

        let kept = match directions.steps.len() {
            0 | 1 => directions.steps.len(),
            n => n - 1,
        };

        let mut steps: Vec<RouteStep> = directions.steps[..kept]
            .iter()
            .map(|step| RouteStep::outdoor(step.location, classify_maneuver(&step.maneuver)))
            .collect();
        steps.push(RouteStep::outdoor(destination, final_instruction));

        Some(OutdoorSegment {
            steps,
            distance_meters: directions.distance_meters.max(0.0),
            duration_seconds: directions.duration_seconds.max(0.0),
        })
    }
}

/// Wraps a [`GraphStore::shortest_path`] call into an indoor segment.
pub struct IndoorSegmentBuilder<'a> {
    store: &'a dyn GraphStore,
    forward_threshold_degrees: f64,
}

impl<'a> IndoorSegmentBuilder<'a> {
    pub fn new(store: &'a dyn GraphStore, forward_threshold_degrees: f64) -> Self {
        Self {
            store,
            forward_threshold_degrees,
        }
    }

    pub fn build(&self, start: &str, end: &str) -> Result<IndoorSegment> {
        let path = self
            .store
            .shortest_path(start, end)?
            .filter(|path| !path.nodes.is_empty())
            .ok_or_else(|| Error::RouteNotFound {
                start: start.to_string(),
                goal: end.to_string(),
            })?;

        let steps = path
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| RouteStep {
                node: node.node.clone(),
                floor: node.floor.clone(),
                node_type: node.node_type.clone(),
                segment_type: SegmentType::Indoor,
                instruction: Some(indoor_instruction(
                    &path.nodes,
                    index,
                    self.forward_threshold_degrees,
                )),
            })
            .collect();

        Ok(IndoorSegment {
            steps,
            weight_meters: path.weight_meters.max(0.0),
        })
    }
}

/// Turn instruction for the node at `index` of an indoor path.
pub fn indoor_instruction(
    nodes: &[PathNode],
    index: usize,
    forward_threshold_degrees: f64,
) -> Instruction {
    let last = nodes.len().saturating_sub(1);
    if index == last {
        return Instruction::new(InstructionKind::Final, "You've arrived!");
    }
    if index == 0 {
        return Instruction::new(InstructionKind::Enter, "Enter the indoor network");
    }
    if nodes[index].is_elevator() {
        return Instruction::new(InstructionKind::Elevator, "Take the elevator");
    }

    let previous = nodes[index - 1].node.coordinates();
    let current = nodes[index].node.coordinates();
    let next = nodes[index + 1].node.coordinates();
    let delta = geo::signed_turn(geo::bearing(previous, current), geo::bearing(current, next));

    if delta.abs() < forward_threshold_degrees {
        Instruction::new(InstructionKind::Forward, "Head straight")
    } else if delta > 0.0 {
        Instruction::new(InstructionKind::Right, "Take a right")
    } else {
        Instruction::new(InstructionKind::Left, "Take a left")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::{DirectionStep, WalkingDirections};
    use crate::store::IndoorPath;

    struct FixedDirections(Option<WalkingDirections>);

    impl DirectionsProvider for FixedDirections {
        fn walk(&self, _: Coordinates, _: Coordinates) -> Result<WalkingDirections> {
            self.0.clone().ok_or_else(|| Error::ProviderUnavailable {
                message: "offline".to_string(),
            })
        }
    }

    struct FixedPath(Option<IndoorPath>);

    impl GraphStore for FixedPath {
        fn resolve_building(&self, name: &str) -> Result<Option<String>> {
            Ok(Some(name.to_string()))
        }
        fn is_disconnected(&self, _: &str) -> Result<bool> {
            Ok(false)
        }
        fn building_coordinates(&self, _: &str) -> Result<Option<Coordinates>> {
            Ok(None)
        }
        fn connected_nodes(&self, _: &str, _: usize) -> Result<Vec<BuildingNode>> {
            Ok(Vec::new())
        }
        fn all_boundary_nodes(&self) -> Result<Vec<BuildingNode>> {
            Ok(Vec::new())
        }
        fn shortest_path(&self, _: &str, _: &str) -> Result<Option<IndoorPath>> {
            Ok(self.0.clone())
        }
    }

    fn step(lat: f64, lon: f64, maneuver: &str) -> DirectionStep {
        DirectionStep {
            location: Coordinates::new(lat, lon),
            maneuver: maneuver.to_string(),
        }
    }

    fn path_node(id: &str, lat: f64, lon: f64, node_type: &str) -> PathNode {
        PathNode {
            node: BuildingNode {
                id: id.to_string(),
                building_name: "Hall".to_string(),
                latitude: lat,
                longitude: lon,
            },
            floor: "1".to_string(),
            node_type: node_type.to_string(),
        }
    }

    #[test]
    fn maneuver_keywords() {
        let cases = [
            ("Enter Coffman Union.", InstructionKind::Enter),
            ("Walk north on Church Street SE.", InstructionKind::Forward),
            ("Continue straight.", InstructionKind::Forward),
            ("Your destination is on your right.", InstructionKind::Final),
            ("You have arrived.", InstructionKind::Final),
            ("Turn right onto Washington Avenue.", InstructionKind::Right),
            ("Turn left.", InstructionKind::Left),
            ("Head northeast.", InstructionKind::Forward),
        ];
        for (text, kind) in cases {
            assert_eq!(classify_maneuver(text).kind, kind, "{text}");
        }
        assert_eq!(classify_maneuver("Turn left.").label, "Turn left");
    }

    #[test]
    fn outdoor_segment_replaces_arrival_with_destination() {
        let destination = Coordinates::new(44.9750, -93.2330);
        let provider = FixedDirections(Some(WalkingDirections {
            steps: vec![
                step(44.9730, -93.2350, "Walk north."),
                step(44.9745, -93.2350, "Turn right."),
                step(44.9749, -93.2331, "You have arrived."),
            ],
            distance_meters: 320.0,
            duration_seconds: 230.0,
        }));

        let segment = OutdoorSegmentBuilder::new(&provider)
            .build(
                Coordinates::new(44.9730, -93.2350),
                destination,
                Instruction::new(InstructionKind::Enter, "Enter Northrop"),
            )
            .expect("segment");

        let kinds: Vec<_> = segment
            .steps
            .iter()
            .map(|s| s.instruction.as_ref().map(|i| i.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(InstructionKind::Forward),
                Some(InstructionKind::Right),
                Some(InstructionKind::Enter)
            ]
        );
        let last = segment.steps.last().unwrap();
        assert_eq!(last.coordinates(), destination);
        assert_eq!(last.node.id, "-93.233,44.975");
        assert_eq!(last.floor, OUTDOOR_FLOOR);
        assert_eq!(last.node_type, OUTDOOR_NODE_TYPE);
        assert_eq!(segment.distance_meters, 320.0);
    }

    #[test]
    fn single_provider_step_is_kept() {
        let provider = FixedDirections(Some(WalkingDirections {
            steps: vec![step(44.9730, -93.2350, "Walk east.")],
            distance_meters: 10.0,
            duration_seconds: 7.0,
        }));
        let segment = OutdoorSegmentBuilder::new(&provider)
            .build(
                Coordinates::new(44.9730, -93.2350),
                Coordinates::new(44.9730, -93.2349),
                Instruction::new(InstructionKind::Final, "Arrive"),
            )
            .unwrap();
        assert_eq!(segment.steps.len(), 2);
    }

    #[test]
    fn provider_failure_yields_no_segment() {
        let provider = FixedDirections(None);
        assert!(OutdoorSegmentBuilder::new(&provider)
            .build(
                Coordinates::new(0.0, 0.0),
                Coordinates::new(0.0, 0.001),
                Instruction::new(InstructionKind::Final, "Arrive"),
            )
            .is_none());
    }

    #[test]
    fn indoor_instructions_follow_geometry() {
        // North, north, east (right), elevator, north (left), end.
        let nodes = vec![
            path_node("1", 44.9700, -93.2300, "building_node"),
            path_node("2", 44.9710, -93.2300, "path"),
            path_node("3", 44.9720, -93.2300, "path"),
            path_node("4", 44.9720, -93.2290, "path"),
            path_node("5", 44.9730, -93.2290, "elevator"),
            path_node("6", 44.9740, -93.2290, "building_node"),
        ];
        let kinds: Vec<_> = (0..nodes.len())
            .map(|i| indoor_instruction(&nodes, i, 20.0).kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                InstructionKind::Enter,
                InstructionKind::Forward,
                InstructionKind::Right,
                InstructionKind::Left,
                InstructionKind::Elevator,
                InstructionKind::Final,
            ]
        );
    }

    #[test]
    fn turn_across_north_is_not_mistaken_for_a_u_turn() {
        // Heading 350 then 10: a 20 degree right turn, not 340 degrees left.
        let nodes = vec![
            path_node("1", 44.9700, -93.2302, "path"),
            path_node("2", 44.9710, -93.2304, "path"),
            path_node("3", 44.9720, -93.2302, "path"),
        ];
        let instruction = indoor_instruction(&nodes, 1, 30.0);
        assert_eq!(instruction.kind, InstructionKind::Forward);
    }

    #[test]
    fn single_node_path_is_final() {
        let nodes = vec![path_node("1", 44.97, -93.23, "building_node")];
        assert_eq!(indoor_instruction(&nodes, 0, 20.0).kind, InstructionKind::Final);
    }

    #[test]
    fn missing_indoor_path_is_route_not_found() {
        let store = FixedPath(None);
        let err = IndoorSegmentBuilder::new(&store, 20.0)
            .build("Coffman Union", "Northrop")
            .unwrap_err();
        assert!(matches!(err, Error::RouteNotFound { .. }));
    }

    #[test]
    fn indoor_segment_keeps_weight_and_metadata() {
        let store = FixedPath(Some(IndoorPath {
            nodes: vec![
                path_node("1", 44.9700, -93.2300, "building_node"),
                path_node("2", 44.9710, -93.2300, "building_node"),
            ],
            weight_meters: 111.0,
        }));
        let segment = IndoorSegmentBuilder::new(&store, 20.0).build("A", "B").unwrap();
        assert_eq!(segment.weight_meters, 111.0);
        assert!(segment
            .steps
            .iter()
            .all(|s| s.segment_type == SegmentType::Indoor && s.floor == "1"));
    }

    #[test]
    fn route_step_serializes_flat_camel_case() {
        let step = RouteStep::outdoor(
            Coordinates::new(44.9, -93.2),
            Instruction::new(InstructionKind::Final, "Arrive"),
        );
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["buildingName"], "");
        assert_eq!(value["nodeType"], "sidewalk");
        assert_eq!(value["segmentType"], "outdoor");
        assert_eq!(value["instruction"]["kind"], "final");
    }
}
