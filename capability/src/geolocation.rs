//! Geolocation adapter: one-shot fetch checked against a plate's geofence.

use std::time::Duration;

use juror_types::{GeoFix, GeoPoint};

use crate::host::PositionSource;
use crate::GeoError;

/// Fetches a single position and decides whether it lies inside the geofence.
///
/// Never retries on its own; a retry is a fresh call to [`fetch`](Self::fetch).
pub struct GeolocationAdapter<S: PositionSource> {
    source: S,
    radius_m: f64,
    timeout: Duration,
}

impl<S: PositionSource> GeolocationAdapter<S> {
    pub fn new(source: S, radius_m: f64, timeout: Duration) -> Self {
        Self {
            source,
            radius_m,
            timeout,
        }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Request the current position and compare it to `center`.
    pub async fn fetch(&self, center: GeoPoint) -> Result<GeoFix, GeoError> {
        let lookup = tokio::time::timeout(self.timeout, self.source.current_position());
        let position = match lookup.await {
            Ok(Ok(position)) => position,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "geolocation failed");
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "geolocation timed out"
                );
                return Err(GeoError::Timeout);
            }
        };

        let fix = GeoFix::against(position, center, self.radius_m);
        tracing::info!(
            distance_m = fix.distance_m,
            in_radius = fix.in_radius,
            "geolocation resolved"
        );
        Ok(fix)
    }
}
