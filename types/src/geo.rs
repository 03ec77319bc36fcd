//! Geographic points, great-circle distance and geofence fixes.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance to `other`, in meters.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

/// A resolved position, checked against a plate's geofence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub position: GeoPoint,
    pub distance_m: f64,
    pub in_radius: bool,
}

impl GeoFix {
    /// Check `position` against a geofence of `radius_m` around `center`.
    /// The boundary itself counts as inside.
    pub fn against(position: GeoPoint, center: GeoPoint, radius_m: f64) -> Self {
        let distance_m = position.distance_m(&center);
        Self {
            position,
            distance_m,
            in_radius: distance_m <= radius_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_to_self() {
        let p = GeoPoint::new(-23.5505, -46.6333);
        assert!(p.distance_m(&p) < 1e-6);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let d = a.distance_m(&b);
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn known_city_distance() {
        // São Paulo -> Rio de Janeiro, roughly 357 km.
        let sp = GeoPoint::new(-23.5505, -46.6333);
        let rj = GeoPoint::new(-22.9068, -43.1729);
        let d = sp.distance_m(&rj) / 1000.0;
        assert!((350.0..365.0).contains(&d), "got {d} km");
    }

    #[test]
    fn fix_inside_and_outside_radius() {
        let center = GeoPoint::new(-23.5505, -46.6333);
        let near = GeoPoint::new(-23.5510, -46.6333);
        let far = GeoPoint::new(-23.5600, -46.6333);
        assert!(GeoFix::against(near, center, 200.0).in_radius);
        assert!(!GeoFix::against(far, center, 200.0).in_radius);
    }
}
