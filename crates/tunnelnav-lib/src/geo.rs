//! Great-circle geometry on WGS84 coordinates.
//!
//! These are the only floating-point sensitive operations in the crate; every
//! other module measures distances and directions through them.

use serde::{Deserialize, Serialize};

/// Mean radius of Earth, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the valid WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Haversine great-circle distance between `a` and `b`, in kilometers.
pub fn distance(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let sin_lat = (d_lat * 0.5).sin();
    let sin_lon = (d_lon * 0.5).sin();
    let h = sin_lat * sin_lat + lat_a.cos() * lat_b.cos() * sin_lon * sin_lon;

    // Rounding can push `h` marginally outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Distance between `a` and `b`, in meters.
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    distance(a, b) * 1000.0
}

/// Initial compass bearing from `a` to `b`, in degrees within `[0, 360)`.
pub fn bearing(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let x = d_lon.sin() * lat_b.cos();
    let y = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * d_lon.cos();

    normalize_bearing(x.atan2(y).to_degrees())
}

/// Smallest angle between two bearings, in degrees within `[0, 180]`.
pub fn angular_difference(b1: f64, b2: f64) -> f64 {
    let diff = (normalize_bearing(b1) - normalize_bearing(b2)).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Signed turn from heading `from` to heading `to`, in degrees within `(-180, 180]`.
///
/// Positive values turn clockwise (right), negative values counter-clockwise (left).
pub fn signed_turn(from: f64, to: f64) -> f64 {
    let delta = normalize_bearing(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

fn normalize_bearing(degrees: f64) -> f64 {
    let value = degrees.rem_euclid(360.0);
    // rem_euclid may return exactly 360.0 for tiny negative inputs.
    if value >= 360.0 {
        0.0
    } else {
        value
    }
}
