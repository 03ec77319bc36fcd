//! Nullable position source.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use juror_capability::{GeoError, PositionSource};
use juror_types::GeoPoint;

use crate::lock;

struct PositionState {
    result: Result<GeoPoint, GeoError>,
    latency: Duration,
    hang: bool,
    calls: usize,
}

/// A position source that reports a fixed, changeable answer.
#[derive(Clone)]
pub struct NullPosition {
    state: Arc<Mutex<PositionState>>,
}

impl NullPosition {
    fn with(result: Result<GeoPoint, GeoError>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PositionState {
                result,
                latency: Duration::ZERO,
                hang: false,
                calls: 0,
            })),
        }
    }

    /// Always at `point`.
    pub fn at(point: GeoPoint) -> Self {
        Self::with(Ok(point))
    }

    /// Always failing with `error`.
    pub fn failing(error: GeoError) -> Self {
        Self::with(Err(error))
    }

    /// Never answers; exercises the adapter's timeout.
    pub fn hanging() -> Self {
        let null = Self::with(Err(GeoError::PositionUnavailable));
        lock(&null.state).hang = true;
        null
    }

    /// Change the answer for later requests.
    pub fn set(&self, result: Result<GeoPoint, GeoError>) {
        let mut state = lock(&self.state);
        state.result = result;
        state.hang = false;
    }

    pub fn set_latency(&self, latency: Duration) {
        lock(&self.state).latency = latency;
    }

    /// Number of position requests received.
    pub fn calls(&self) -> usize {
        lock(&self.state).calls
    }
}

impl PositionSource for NullPosition {
    async fn current_position(&self) -> Result<GeoPoint, GeoError> {
        let (result, latency, hang) = {
            let mut state = lock(&self.state);
            state.calls += 1;
            (state.result, state.latency, state.hang)
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juror_capability::GeolocationAdapter;

    #[tokio::test]
    async fn answer_can_change_between_fetches() {
        let center = GeoPoint::new(-23.5505, -46.6333);
        let position = NullPosition::failing(GeoError::PositionUnavailable);
        let geo = GeolocationAdapter::new(position.clone(), 200.0, Duration::from_secs(5));
        assert_eq!(geo.fetch(center).await, Err(GeoError::PositionUnavailable));

        position.set(Ok(center));
        assert!(geo.fetch(center).await.unwrap().in_radius);
        assert_eq!(position.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_source_times_out() {
        let geo = GeolocationAdapter::new(NullPosition::hanging(), 200.0, Duration::from_secs(10));
        assert_eq!(
            geo.fetch(GeoPoint::new(0.0, 0.0)).await,
            Err(GeoError::Timeout)
        );
    }
}
