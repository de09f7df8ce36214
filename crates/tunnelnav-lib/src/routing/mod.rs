//! Route composition for campus navigation.
//!
//! This module provides:
//! - [`RouteRequest`] - Destination building plus the user's location
//! - [`RouteResult`] - Ordered segments with summed distance and time
//! - [`RouteComposer`] - The per-request state machine that stitches
//!   outdoor and indoor segments together
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tunnelnav_lib::{load_campus, RouteComposer, RouteRequest, StraightLineDirections};
//!
//! let campus = load_campus("docs/fixtures/campus.json".as_ref())?;
//! let composer = RouteComposer::new(Arc::new(campus), Arc::new(StraightLineDirections::default()));
//! let route = composer.compose(&RouteRequest::new("Northrop", 44.9725, -93.2350))?;
//! println!("{} segments, {:.0} m", route.segments.len(), route.total_distance_meters);
//! ```

mod composer;

pub use composer::RouteComposer;

use serde::{Deserialize, Serialize};

use crate::config::RoutingPreference;
use crate::geo::Coordinates;
use crate::segment::{IndoorSegment, OutdoorSegment, RouteStep, SegmentType};

/// Inbound routing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub target_building_name: String,
    pub user_latitude: f64,
    pub user_longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference: Option<RoutingPreference>,
}

impl RouteRequest {
    pub fn new(target: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            target_building_name: target.into(),
            user_latitude: latitude,
            user_longitude: longitude,
            preference: None,
        }
    }

    pub fn with_preference(mut self, preference: RoutingPreference) -> Self {
        self.preference = Some(preference);
        self
    }

    pub fn user_location(&self) -> Coordinates {
        Coordinates::new(self.user_latitude, self.user_longitude)
    }
}

/// Single-modality portion of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub segment_type: SegmentType,
    pub steps: Vec<RouteStep>,
}

/// Composed route. Distances are in meters, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub segments: Vec<RouteSegment>,
    pub total_distance_meters: f64,
    pub total_time_seconds: f64,
}

impl RouteResult {
    pub(crate) fn direct(segment: OutdoorSegment) -> Self {
        Self {
            total_distance_meters: segment.distance_meters,
            total_time_seconds: segment.duration_seconds,
            segments: vec![RouteSegment {
                segment_type: SegmentType::Outdoor,
                steps: segment.steps,
            }],
        }
    }

    /// Segment types in route order.
    pub fn segment_types(&self) -> Vec<SegmentType> {
        self.segments.iter().map(|segment| segment.segment_type).collect()
    }
}

/// Concatenate the non-empty legs of a tunnel route and sum their measurements.
///
/// The indoor leg has no native timing, so its time is its weight divided by
/// `indoor_walking_speed`, rounded to whole seconds.
pub fn aggregate(
    first: Option<OutdoorSegment>,
    indoor: IndoorSegment,
    second: Option<OutdoorSegment>,
    indoor_walking_speed: f64,
) -> RouteResult {
    let mut segments = Vec::with_capacity(3);
    let mut total_distance_meters = indoor.weight_meters;
    let mut total_time_seconds = (indoor.weight_meters / indoor_walking_speed).round();

    if let Some(first) = first.filter(|segment| !segment.steps.is_empty()) {
        total_distance_meters += first.distance_meters;
        total_time_seconds += first.duration_seconds;
        segments.push(RouteSegment {
            segment_type: SegmentType::Outdoor,
            steps: first.steps,
        });
    }

    segments.push(RouteSegment {
        segment_type: SegmentType::Indoor,
        steps: indoor.steps,
    });

    if let Some(second) = second.filter(|segment| !segment.steps.is_empty()) {
        total_distance_meters += second.distance_meters;
        total_time_seconds += second.duration_seconds;
        segments.push(RouteSegment {
            segment_type: SegmentType::Outdoor,
            steps: second.steps,
        });
    }

    RouteResult {
        segments,
        total_distance_meters,
        total_time_seconds,
    }
}
