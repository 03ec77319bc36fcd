//! Host-platform capability traits.

use std::future::Future;

use juror_types::{Facing, Frame, GeoPoint};

use crate::{GeoError, MediaError};

/// Target aspect ratio of the video stream (width / height).
pub const PORTRAIT_3_4: f64 = 3.0 / 4.0;

/// Constraints for a video-only stream request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoConstraints {
    /// `None` lets the host pick any camera.
    pub facing: Option<Facing>,
    pub aspect_ratio: f64,
}

impl VideoConstraints {
    /// First attempt: requested facing mode and a 3:4 aspect ratio.
    pub fn preferred(facing: Facing) -> Self {
        Self {
            facing: Some(facing),
            aspect_ratio: PORTRAIT_3_4,
        }
    }

    /// Fallback: aspect ratio only.
    pub fn relaxed() -> Self {
        Self {
            facing: None,
            aspect_ratio: PORTRAIT_3_4,
        }
    }
}

/// A live video stream.
pub trait MediaStream: Send {
    /// Copy the current video frame.
    fn grab_frame(&mut self) -> Result<Frame, MediaError>;

    /// Stop every track of the stream. Must be idempotent.
    fn stop(&mut self);
}

/// Access to the host's cameras.
pub trait MediaDevices: Send + Sync {
    type Stream: MediaStream + 'static;

    /// Request a video-only stream.
    fn get_user_media(
        &self,
        constraints: VideoConstraints,
    ) -> impl Future<Output = Result<Self::Stream, MediaError>> + Send;
}

/// One-shot access to the host's position.
pub trait PositionSource: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<GeoPoint, GeoError>> + Send;
}
