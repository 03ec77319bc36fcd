//! Nullable camera: scripted media devices with live-stream accounting.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use juror_capability::{MediaDevices, MediaError, MediaStream, VideoConstraints};
use juror_types::Frame;

use crate::lock;

struct CameraState {
    start_failures: Mutex<VecDeque<MediaError>>,
    grab_failures: Mutex<VecDeque<MediaError>>,
    requests: Mutex<Vec<VideoConstraints>>,
    frame: Mutex<Frame>,
    latency: Mutex<Duration>,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

/// A camera host that hands out fake streams.
///
/// Tracks how many streams are live at once so tests can assert the
/// single-stream guarantee.
#[derive(Clone)]
pub struct NullCamera {
    state: Arc<CameraState>,
}

impl Default for NullCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl NullCamera {
    /// A working camera delivering 1280x720 landscape frames.
    pub fn new() -> Self {
        Self {
            state: Arc::new(CameraState {
                start_failures: Mutex::new(VecDeque::new()),
                grab_failures: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
                frame: Mutex::new(Frame::solid(1280, 720, [200, 120, 60, 255])),
                latency: Mutex::new(Duration::ZERO),
                live: AtomicUsize::new(0),
                max_live: AtomicUsize::new(0),
            }),
        }
    }

    /// Fail the next stream request with `error`. Calls queue up.
    pub fn fail_next_start(&self, error: MediaError) {
        lock(&self.state.start_failures).push_back(error);
    }

    /// Fail the next frame grab with `error`.
    pub fn fail_next_grab(&self, error: MediaError) {
        lock(&self.state.grab_failures).push_back(error);
    }

    /// Frame returned by every subsequent grab.
    pub fn set_frame(&self, frame: Frame) {
        *lock(&self.state.frame) = frame;
    }

    /// Delay every stream request by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.state.latency) = latency;
    }

    /// Constraints of every stream request so far, in order.
    pub fn requests(&self) -> Vec<VideoConstraints> {
        lock(&self.state.requests).clone()
    }

    pub fn live_streams(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live streams ever observed.
    pub fn max_live_streams(&self) -> usize {
        self.state.max_live.load(Ordering::SeqCst)
    }
}

impl MediaDevices for NullCamera {
    type Stream = NullStream;

    async fn get_user_media(
        &self,
        constraints: VideoConstraints,
    ) -> Result<NullStream, MediaError> {
        let latency = *lock(&self.state.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        lock(&self.state.requests).push(constraints);
        if let Some(error) = lock(&self.state.start_failures).pop_front() {
            return Err(error);
        }

        let live = self.state.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(NullStream {
            state: self.state.clone(),
            stopped: false,
        })
    }
}

/// A fake live stream. Counts as live until stopped.
pub struct NullStream {
    state: Arc<CameraState>,
    stopped: bool,
}

impl MediaStream for NullStream {
    fn grab_frame(&mut self) -> Result<Frame, MediaError> {
        if self.stopped {
            return Err(MediaError::Aborted);
        }
        if let Some(error) = lock(&self.state.grab_failures).pop_front() {
            return Err(error);
        }
        Ok(lock(&self.state.frame).clone())
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.state.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
