//! Outdoor walking-directions providers.

use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{self, Coordinates};

/// Environment variable holding the Mapbox access token.
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_API_KEY";

const MAPBOX_API_BASE: &str = "https://api.mapbox.com/directions/v5/mapbox";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One maneuver of a walking route.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionStep {
    /// Where the user stands when the maneuver applies.
    pub location: Coordinates,
    pub maneuver: String,
}

/// A walking route as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkingDirections {
    pub steps: Vec<DirectionStep>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Source of outdoor walking directions.
///
/// Implementations are called from worker threads and must enforce their own
/// per-call timeout.
pub trait DirectionsProvider: Send + Sync {
    fn walk(&self, origin: Coordinates, destination: Coordinates) -> Result<WalkingDirections>;
}

/// Mapbox Directions API client (walking profile).
#[derive(Debug, Clone)]
pub struct MapboxDirections {
    client: Client,
    access_token: String,
    base_url: String,
}

impl MapboxDirections {
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(access_token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(access_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tunnelnav/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)?;
        Ok(Self {
            client,
            access_token: access_token.into(),
            base_url: MAPBOX_API_BASE.to_string(),
        })
    }

    /// Build a client from `MAPBOX_API_KEY`, or `None` when it is unset or blank.
    pub fn from_env() -> Result<Option<Self>> {
        match env::var(MAPBOX_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Ok(Some(Self::new(token.trim())?)),
            _ => Ok(None),
        }
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_url(&self, origin: Coordinates, destination: Coordinates) -> String {
        format!(
            "{}/walking/{},{};{},{}",
            self.base_url,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude
        )
    }
}

impl DirectionsProvider for MapboxDirections {
    fn walk(&self, origin: Coordinates, destination: Coordinates) -> Result<WalkingDirections> {
        let url = self.request_url(origin, destination);
        debug!(url = %url, "requesting walking directions");

        let body = self
            .client
            .get(&url)
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("alternatives", "false"),
                ("continue_straight", "true"),
                ("geometries", "geojson"),
                ("overview", "full"),
                ("steps", "true"),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        parse_mapbox_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<MapboxRoute>,
}

#[derive(Debug, Deserialize)]
struct MapboxRoute {
    distance: f64,
    duration: f64,
    #[serde(default)]
    legs: Vec<MapboxLeg>,
}

#[derive(Debug, Deserialize)]
struct MapboxLeg {
    #[serde(default)]
    steps: Vec<MapboxStep>,
}

#[derive(Debug, Deserialize)]
struct MapboxStep {
    maneuver: MapboxManeuver,
}

#[derive(Debug, Deserialize)]
struct MapboxManeuver {
    /// `[longitude, latitude]`.
    location: [f64; 2],
    #[serde(default)]
    instruction: String,
}

/// Decode a Mapbox Directions response body.
pub fn parse_mapbox_response(body: &str) -> Result<WalkingDirections> {
    let response: MapboxResponse = serde_json::from_str(body)?;

    if let Some(code) = response.code.as_deref() {
        if code != "Ok" {
            return Err(Error::ProviderUnavailable {
                message: response
                    .message
                    .unwrap_or_else(|| format!("directions request failed with code {code}")),
            });
        }
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| Error::ProviderUnavailable {
            message: "no walking route returned".to_string(),
        })?;

    let steps = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| DirectionStep {
            location: Coordinates::new(step.maneuver.location[1], step.maneuver.location[0]),
            maneuver: step.maneuver.instruction,
        })
        .collect();

    Ok(WalkingDirections {
        steps,
        distance_meters: route.distance,
        duration_seconds: route.duration,
    })
}

/// Offline provider that walks in a straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLineDirections {
    /// Meters per second.
    pub walking_speed: f64,
}

impl Default for StraightLineDirections {
    fn default() -> Self {
        Self { walking_speed: 1.4 }
    }
}

impl DirectionsProvider for StraightLineDirections {
    fn walk(&self, origin: Coordinates, destination: Coordinates) -> Result<WalkingDirections> {
        if !origin.is_valid() || !destination.is_valid() {
            return Err(Error::ProviderUnavailable {
                message: "straight-line walk requires valid coordinates".to_string(),
            });
        }
        let distance_meters = geo::distance_meters(origin, destination);
        Ok(WalkingDirections {
            steps: vec![
                DirectionStep {
                    location: origin,
                    maneuver: "Walk toward your destination".to_string(),
                },
                DirectionStep {
                    location: destination,
                    maneuver: "You have arrived at your destination".to_string(),
                },
            ],
            distance_meters,
            duration_seconds: distance_meters / self.walking_speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "code": "Ok",
        "routes": [{
            "distance": 312.4,
            "duration": 224.9,
            "legs": [{
                "steps": [
                    {"maneuver": {"location": [-93.2350, 44.9730], "instruction": "Walk north on Church Street SE."}},
                    {"maneuver": {"location": [-93.2350, 44.9745], "instruction": "Turn right onto Washington Avenue."}},
                    {"maneuver": {"location": [-93.2330, 44.9745], "instruction": "Your destination is on your left."}}
                ]
            }]
        }]
    }"#;

    #[test]
    fn parses_routes_and_swaps_coordinate_order() {
        let directions = parse_mapbox_response(SAMPLE).unwrap();
        assert_eq!(directions.steps.len(), 3);
        assert_eq!(directions.steps[0].location, Coordinates::new(44.9730, -93.2350));
        assert_eq!(directions.steps[1].maneuver, "Turn right onto Washington Avenue.");
        assert_eq!(directions.distance_meters, 312.4);
        assert_eq!(directions.duration_seconds, 224.9);
    }

    #[test]
    fn provider_error_codes_are_unavailable() {
        let err = parse_mapbox_response(r#"{"code":"NoRoute","message":"No route found","routes":[]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable { ref message } if message == "No route found"));
    }

    #[test]
    fn empty_route_list_is_unavailable() {
        let err = parse_mapbox_response(r#"{"routes":[]}"#).unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable { .. }));
        assert!(matches!(parse_mapbox_response("not json").unwrap_err(), Error::Json(_)));
    }

    #[test]
    fn request_url_uses_lon_lat_order() {
        let client = MapboxDirections::new("token")
            .unwrap()
            .with_base_url("http://localhost:9000/");
        let url = client.request_url(
            Coordinates::new(44.9730, -93.2350),
            Coordinates::new(44.9750, -93.2330),
        );
        assert_eq!(url, "http://localhost:9000/walking/-93.235,44.973;-93.233,44.975");
    }

    #[test]
    fn straight_line_walk_times_distance() {
        let origin = Coordinates::new(44.9730, -93.2350);
        let destination = Coordinates::new(44.9740, -93.2350);
        let walk = StraightLineDirections::default().walk(origin, destination).unwrap();
        assert_eq!(walk.steps.len(), 2);
        assert_eq!(walk.steps[1].location, destination);
        assert!((walk.duration_seconds - walk.distance_meters / 1.4).abs() < 1e-9);
    }
}
