//! Tunnelnav library entry points.
//!
//! This crate loads a campus tunnel/skyway network into memory and composes
//! walking routes that combine outdoor directions with indoor pathfinding.
//! Higher-level consumers (the CLI, HTTP front ends) should only depend on
//! the items exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod campus;
pub mod classify;
pub mod config;
pub mod directions;
pub mod error;
pub mod geo;
pub mod graph;
pub mod output;
pub mod path;
pub mod routing;
pub mod segment;
pub mod selection;
pub mod store;
pub mod visits;

pub use campus::{campus_from_json, load_campus, Building, Campus, CampusData, DEFAULT_SEARCH_LIMIT};
pub use config::{RoutingConfig, RoutingPreference};
pub use directions::{
    DirectionStep, DirectionsProvider, MapboxDirections, StraightLineDirections, WalkingDirections,
};
pub use error::{Error, ErrorKind, Result};
pub use geo::Coordinates;
pub use output::{RouteRenderMode, RouteSummary};
pub use routing::{RouteComposer, RouteRequest, RouteResult, RouteSegment};
pub use segment::{Instruction, InstructionKind, RouteStep, SegmentType};
pub use store::{BuildingNode, GraphStore};
pub use visits::{NoopVisitCounter, ThrottledVisitCounter, VisitCounter};
