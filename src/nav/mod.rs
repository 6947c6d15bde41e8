//! # Great-Circle Navigation
//!
//! Distance, initial bearing and 16-point compass labels between two
//! positions on a spherical earth. All functions are pure.

/// Mean earth radius in meters (spherical model)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Width of one compass sector in degrees
const SECTOR_DEG: f64 = 22.5;

/// The 16 compass labels, clockwise from north.
pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees (positive north)
    pub lat: f64,
    /// Longitude in degrees (positive east)
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Fixed point that distance and bearing are reported against.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoint {
    /// Label used in the status header
    pub name: String,
    /// Location of the reference point
    pub point: GeoPoint,
}

impl ReferencePoint {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            point: GeoPoint::new(lat, lng),
        }
    }
}

/// Great-circle distance between two points in meters.
///
/// Uses the haversine formula on a sphere of [`EARTH_RADIUS_M`].
///
/// # Example
///
/// ```
/// use field_logger::nav::{distance_m, GeoPoint};
///
/// // One degree of latitude is roughly 111 km
/// let d = distance_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
/// assert!((d - 111_195.0).abs() < 10.0);
/// ```
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` towards `b` in degrees, `[0, 360)`, clockwise
/// from true north.
///
/// Identical points have no defined bearing and report `0.0`.
pub fn initial_bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Label of the 22.5° sector centered on a compass point.
///
/// Lower sector bounds are inclusive, upper bounds exclusive; `N` covers
/// `[348.75, 360)` and `[0, 11.25)`. Any finite angle is accepted and
/// wrapped into `[0, 360)` first.
pub fn compass_point(degrees: f64) -> &'static str {
    let normalized = normalize_degrees(degrees);
    let sector = ((normalized + SECTOR_DEG / 2.0) / SECTOR_DEG).floor() as usize;
    COMPASS_POINTS[sector % COMPASS_POINTS.len()]
}

fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
