//! Spherical-earth geodesy.
//!
//! Positions are converted to unit normal vectors (n-vectors) so distance,
//! initial bearing and destination all reduce to a few dot and cross products.
//! This stays well-conditioned for short legs and near the antimeridian, where
//! the haversine/atan2 forms need special casing.

use glam::DVec3;

use crate::entity::GeoPosition;

/// Mean earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per nautical mile.
pub const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

/// Metres per second in one knot.
pub const KNOTS_TO_METERS_PER_SECOND: f64 = METERS_PER_NAUTICAL_MILE / 3600.0;

/// Normalizes an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_heading(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn to_nvector(latitude: f64, longitude: f64) -> DVec3 {
    let (lat, lon) = (latitude.to_radians(), longitude.to_radians());
    DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

fn from_nvector(n: DVec3) -> (f64, f64) {
    let latitude = n.z.atan2(n.x.hypot(n.y)).to_degrees();
    let longitude = n.y.atan2(n.x).to_degrees();
    (latitude, longitude)
}

/// Great-circle distance between two positions in metres. Altitude is ignored.
#[must_use]
pub fn distance_m(from: &GeoPosition, to: &GeoPosition) -> f64 {
    let a = to_nvector(from.latitude, from.longitude);
    let b = to_nvector(to.latitude, to.longitude);
    a.cross(b).length().atan2(a.dot(b)) * EARTH_RADIUS_M
}

/// Initial great-circle bearing from `from` to `to`, in degrees `[0, 360)`.
///
/// Returns 0 for coincident points; callers that care should check the
/// distance first.
#[must_use]
pub fn bearing_deg(from: &GeoPosition, to: &GeoPosition) -> f64 {
    let a = to_nvector(from.latitude, from.longitude);
    let b = to_nvector(to.latitude, to.longitude);
    let track = a.cross(b);
    let meridian = a.cross(DVec3::Z);
    let sin = track.cross(meridian).dot(a);
    let cos = track.dot(meridian);
    normalize_heading(sin.atan2(cos).to_degrees())
}

/// Position reached after travelling `distance_m` metres along the great
/// circle leaving `from` on `bearing` degrees. Altitude is carried over.
#[must_use]
pub fn destination(from: &GeoPosition, bearing: f64, distance_m: f64) -> GeoPosition {
    if distance_m == 0.0 {
        return *from;
    }
    let a = to_nvector(from.latitude, from.longitude);
    let east = DVec3::Z.cross(a);
    // At the poles every direction is south; pick the prime meridian frame.
    let east = if east.length_squared() < 1e-24 {
        DVec3::Y
    } else {
        east.normalize()
    };
    let north = a.cross(east);

    let theta = bearing.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;
    let direction = north * theta.cos() + east * theta.sin();
    let b = a * delta.cos() + direction * delta.sin();

    let (latitude, longitude) = from_nvector(b);
    GeoPosition::new(latitude, longitude, from.altitude)
}
