//! Camera adapter: exactly one active stream, facing switch, fallback constraints.

use juror_types::{Facing, Frame};

use crate::host::{MediaDevices, MediaStream, VideoConstraints};
use crate::{CameraError, MediaError};

/// Owns at most one live stream from a [`MediaDevices`] host.
///
/// Every `start` stops the previous stream first, and the stream is stopped
/// when the adapter is dropped, so the hardware is never leaked.
pub struct CameraAdapter<D: MediaDevices> {
    devices: D,
    stream: Option<D::Stream>,
    facing: Option<Facing>,
}

impl<D: MediaDevices> CameraAdapter<D> {
    pub fn new(devices: D) -> Self {
        Self {
            devices,
            stream: None,
            facing: None,
        }
    }

    /// Acquire a stream facing `preferred`.
    ///
    /// If the host cannot satisfy the facing-mode constraint, retries once
    /// with the aspect ratio alone. On success the requested facing mode is
    /// recorded as active.
    pub async fn start(&mut self, preferred: Facing) -> Result<Facing, CameraError> {
        self.stop();

        let stream = match self
            .devices
            .get_user_media(VideoConstraints::preferred(preferred))
            .await
        {
            Ok(stream) => stream,
            Err(MediaError::Overconstrained(constraint)) => {
                tracing::warn!(
                    %constraint,
                    "camera constraint rejected, retrying without facing mode"
                );
                self.devices
                    .get_user_media(VideoConstraints::relaxed())
                    .await
                    .map_err(|e| {
                        tracing::warn!(error = %e, "camera fallback request failed");
                        CameraError::from(e)
                    })?
            }
            Err(e) => {
                tracing::warn!(error = %e, "camera request failed");
                return Err(e.into());
            }
        };

        self.stream = Some(stream);
        self.facing = Some(preferred);
        tracing::info!(facing = ?preferred, "camera stream started");
        Ok(preferred)
    }

    /// Restart with the opposite of the active facing mode (back if none yet).
    pub async fn switch_facing(&mut self) -> Result<Facing, CameraError> {
        let next = self.facing.unwrap_or(Facing::Front).opposite();
        self.start(next).await
    }

    /// Release every track of the current stream. Safe to call when idle.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("camera stream stopped");
        }
    }

    /// Copy the current frame of the live stream.
    pub fn grab_frame(&mut self) -> Result<Frame, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::NotActive)?;
        stream.grab_frame().map_err(CameraError::from)
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Facing mode of the last successful start.
    pub fn facing(&self) -> Option<Facing> {
        self.facing
    }
}

impl<D: MediaDevices> Drop for CameraAdapter<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeStream {
        live: Arc<AtomicUsize>,
        stopped: bool,
    }

    impl MediaStream for FakeStream {
        fn grab_frame(&mut self) -> Result<Frame, MediaError> {
            Ok(Frame::solid(4, 3, [0, 0, 0, 255]))
        }

        fn stop(&mut self) {
            if !self.stopped {
                self.stopped = true;
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    #[derive(Default)]
    struct FakeDevices {
        failures: Mutex<VecDeque<MediaError>>,
        requests: Mutex<Vec<VideoConstraints>>,
        live: Arc<AtomicUsize>,
    }

    impl FakeDevices {
        fn failing(errors: Vec<MediaError>) -> Self {
            Self {
                failures: Mutex::new(errors.into()),
                ..Self::default()
            }
        }
    }

    impl MediaDevices for FakeDevices {
        type Stream = FakeStream;

        async fn get_user_media(
            &self,
            constraints: VideoConstraints,
        ) -> Result<FakeStream, MediaError> {
            self.requests.lock().unwrap().push(constraints);
            if let Some(e) = self.failures.lock().unwrap().pop_front() {
                return Err(e);
            }
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(FakeStream {
                live: self.live.clone(),
                stopped: false,
            })
        }
    }

    #[tokio::test]
    async fn start_requests_facing_and_aspect() {
        let mut camera = CameraAdapter::new(FakeDevices::default());
        assert_eq!(camera.start(Facing::Back).await, Ok(Facing::Back));
        assert!(camera.is_active());
        let requests = camera.devices.requests.lock().unwrap().clone();
        assert_eq!(requests, vec![VideoConstraints::preferred(Facing::Back)]);
    }

    #[tokio::test]
    async fn overconstrained_falls_back_once() {
        let devices = FakeDevices::failing(vec![MediaError::Overconstrained("facingMode".into())]);
        let mut camera = CameraAdapter::new(devices);
        assert_eq!(camera.start(Facing::Back).await, Ok(Facing::Back));
        let requests = camera.devices.requests.lock().unwrap().clone();
        assert_eq!(
            requests,
            vec![
                VideoConstraints::preferred(Facing::Back),
                VideoConstraints::relaxed()
            ]
        );
    }

    #[tokio::test]
    async fn fallback_failure_is_classified() {
        let devices = FakeDevices::failing(vec![
            MediaError::Overconstrained("facingMode".into()),
            MediaError::Overconstrained("aspectRatio".into()),
        ]);
        let mut camera = CameraAdapter::new(devices);
        assert_eq!(
            camera.start(Facing::Back).await,
            Err(CameraError::ConstraintsUnsatisfiable)
        );
        assert!(!camera.is_active());
        assert_eq!(camera.devices.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn permission_denied_does_not_retry() {
        let devices = FakeDevices::failing(vec![MediaError::NotAllowed]);
        let mut camera = CameraAdapter::new(devices);
        assert_eq!(
            camera.start(Facing::Back).await,
            Err(CameraError::PermissionDenied)
        );
        assert_eq!(camera.devices.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn restart_keeps_a_single_live_stream() {
        let mut camera = CameraAdapter::new(FakeDevices::default());
        let live = camera.devices.live.clone();
        camera.start(Facing::Back).await.unwrap();
        camera.start(Facing::Back).await.unwrap();
        assert_eq!(camera.switch_facing().await, Ok(Facing::Front));
        assert_eq!(live.load(Ordering::SeqCst), 1);
        assert_eq!(camera.facing(), Some(Facing::Front));
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_drop_releases() {
        let mut camera = CameraAdapter::new(FakeDevices::default());
        let live = camera.devices.live.clone();
        camera.stop();
        camera.start(Facing::Back).await.unwrap();
        camera.stop();
        camera.stop();
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert_eq!(camera.grab_frame(), Err(CameraError::NotActive));

        camera.start(Facing::Front).await.unwrap();
        assert_eq!(live.load(Ordering::SeqCst), 1);
        drop(camera);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn grab_frame_from_live_stream() {
        let mut camera = CameraAdapter::new(FakeDevices::default());
        camera.start(Facing::Back).await.unwrap();
        let frame = camera.grab_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 3));
    }
}
