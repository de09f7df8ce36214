//! Tunable routing constants.
//!
//! Every threshold used by node selection, segment building and composition
//! lives on [`RoutingConfig`]. Defaults reflect the values the campus
//! deployment runs with; `TUNNELNAV_*` environment variables override them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

/// How strongly the user prefers staying indoors on the way to a
/// disconnected building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoutingPreference {
    /// Minimise outdoor walking even if the tunnel leg gets longer.
    Indoor,
    #[default]
    Balanced,
    /// Minimise total distance.
    Fastest,
}

impl fmt::Display for RoutingPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RoutingPreference::Indoor => "indoor",
            RoutingPreference::Balanced => "balanced",
            RoutingPreference::Fastest => "fastest",
        };
        f.write_str(value)
    }
}

impl FromStr for RoutingPreference {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "indoor" => Ok(RoutingPreference::Indoor),
            "balanced" => Ok(RoutingPreference::Balanced),
            "fastest" => Ok(RoutingPreference::Fastest),
            other => Err(Error::invalid_input(format!(
                "unknown routing preference '{other}'; expected indoor, balanced or fastest"
            ))),
        }
    }
}

/// Named routing constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Start nodes may be at most this factor farther from the destination
    /// than the user is.
    pub forward_leeway_factor: f64,
    /// Number of ranked start nodes returned to the composer.
    pub max_start_nodes: usize,
    /// Weight of the direction misalignment in start-node cost.
    pub direction_angle_weight: f64,
    /// Cost multiplier applied to the destination itself when other
    /// candidates remain.
    pub target_penalty_multiplier: f64,
    /// Below this distance the composer tries a plain outdoor walk first.
    pub min_direct_walk_meters: f64,
    /// Users this close to an indoor node are treated as already inside.
    pub inside_building_meters: f64,
    /// Exit nodes considered for a disconnected building.
    pub max_exit_radius_km: f64,
    /// Straight-line to tunnel length factor.
    pub tunnel_estimate_factor: f64,
    /// Walking speed in m/s used to time the indoor leg.
    pub indoor_walking_speed: f64,
    /// Hop ceiling for connected-candidate discovery.
    pub max_connected_hops: usize,
    /// Indoor turns sharper than this become left/right instructions.
    pub forward_turn_threshold_degrees: f64,
    pub default_preference: RoutingPreference,
    pub indoor_outdoor_penalty: f64,
    pub balanced_outdoor_penalty: f64,
    pub fastest_outdoor_penalty: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            forward_leeway_factor: 1.1,
            max_start_nodes: 1,
            direction_angle_weight: 1.0,
            target_penalty_multiplier: 1.15,
            min_direct_walk_meters: 100.0,
            inside_building_meters: 25.0,
            max_exit_radius_km: 0.5,
            tunnel_estimate_factor: 1.4,
            indoor_walking_speed: 1.4,
            max_connected_hops: 400,
            forward_turn_threshold_degrees: 20.0,
            default_preference: RoutingPreference::Balanced,
            indoor_outdoor_penalty: 2.0,
            balanced_outdoor_penalty: 1.5,
            fastest_outdoor_penalty: 1.0,
        }
    }
}

impl RoutingConfig {
    /// Outdoor-distance multiplier for exit-node ranking.
    pub fn outdoor_penalty(&self, preference: RoutingPreference) -> f64 {
        match preference {
            RoutingPreference::Indoor => self.indoor_outdoor_penalty,
            RoutingPreference::Balanced => self.balanced_outdoor_penalty,
            RoutingPreference::Fastest => self.fastest_outdoor_penalty,
        }
    }

    /// Defaults overridden by `TUNNELNAV_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `TUNNELNAV_*` key. Unparseable or out-of-range values are logged and
    /// ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        override_value(&lookup, "TUNNELNAV_FORWARD_LEEWAY", &mut config.forward_leeway_factor, positive);
        override_value(&lookup, "TUNNELNAV_MAX_START_NODES", &mut config.max_start_nodes, at_least_one);
        override_value(&lookup, "TUNNELNAV_ANGLE_WEIGHT", &mut config.direction_angle_weight, non_negative);
        override_value(&lookup, "TUNNELNAV_TARGET_PENALTY", &mut config.target_penalty_multiplier, positive);
        override_value(&lookup, "TUNNELNAV_MIN_DIRECT_WALK_METERS", &mut config.min_direct_walk_meters, non_negative);
        override_value(&lookup, "TUNNELNAV_INSIDE_BUILDING_METERS", &mut config.inside_building_meters, non_negative);
        override_value(&lookup, "TUNNELNAV_MAX_EXIT_RADIUS_KM", &mut config.max_exit_radius_km, positive);
        override_value(&lookup, "TUNNELNAV_TUNNEL_FACTOR", &mut config.tunnel_estimate_factor, positive);
        override_value(&lookup, "TUNNELNAV_WALKING_SPEED", &mut config.indoor_walking_speed, positive);
        override_value(&lookup, "TUNNELNAV_MAX_HOPS", &mut config.max_connected_hops, at_least_one);
        override_value(&lookup, "TUNNELNAV_TURN_THRESHOLD", &mut config.forward_turn_threshold_degrees, non_negative);
        override_value(&lookup, "TUNNELNAV_PREFERENCE", &mut config.default_preference, |_| true);

        config
    }
}

fn override_value<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
    accept: impl Fn(&T) -> bool,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => *slot = value,
        _ => warn!(key, value = %raw, "ignoring malformed configuration override"),
    }
}

fn positive(value: &f64) -> bool {
    value.is_finite() && *value > 0.0
}

fn non_negative(value: &f64) -> bool {
    value.is_finite() && *value >= 0.0
}

fn at_least_one(value: &usize) -> bool {
    *value >= 1
}
