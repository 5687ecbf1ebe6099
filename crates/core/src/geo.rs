//! Geofence math for site check-ins.
//!
//! Check-in is a near-exact proximity match: the reported GPS coordinate
//! must fall within [`CHECK_IN_RADIUS_METERS`] of the site's registered
//! location. The radius is deliberately sub-meter; the check binds a phone
//! standing on the site to the coordinate registered for that site, it is
//! not a generous "nearby" search.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius in meters, used by the haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Maximum distance between the reported and registered coordinates for a
/// check-in to be accepted.
pub const CHECK_IN_RADIUS_METERS: f64 = 0.37;

/// A WGS84 coordinate. Serialized as `{ "longitude": .., "latitude": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Validate coordinate ranges: longitude in [-180, 180], latitude in
    /// [-90, 90], both finite.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::Validation(format!(
                "Invalid longitude {}",
                self.longitude
            )));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::Validation(format!(
                "Invalid latitude {}",
                self.latitude
            )));
        }
        Ok(())
    }
}

/// Great-circle distance between two points in meters (haversine on a
/// spherical Earth).
pub fn haversine_distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Whether `reported` is close enough to `registered` to count as being
/// physically on site.
pub fn within_check_in_radius(registered: GeoPoint, reported: GeoPoint) -> bool {
    haversine_distance_meters(registered, reported) <= CHECK_IN_RADIUS_METERS
}
