//! Capability failure classes.

use thiserror::Error;

/// Raw failure reported by the host media layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("permission to use the camera was denied")]
    NotAllowed,

    #[error("no camera device found")]
    NotFound,

    #[error("camera could not be read: {0}")]
    NotReadable(String),

    #[error("constraint {0} cannot be satisfied")]
    Overconstrained(String),

    #[error("camera request aborted")]
    Aborted,
}

/// Camera failure, as surfaced to the juror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera found on this device")]
    NoDevice,

    #[error("camera is in use by another application")]
    DeviceBusy,

    #[error("camera does not support the requested settings")]
    ConstraintsUnsatisfiable,

    #[error("camera is not running")]
    NotActive,
}

impl From<MediaError> for CameraError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::NotAllowed => CameraError::PermissionDenied,
            MediaError::NotFound => CameraError::NoDevice,
            MediaError::NotReadable(_) | MediaError::Aborted => CameraError::DeviceBusy,
            MediaError::Overconstrained(_) => CameraError::ConstraintsUnsatisfiable,
        }
    }
}

/// Geolocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_errors_classify_into_closed_set() {
        assert_eq!(CameraError::from(MediaError::NotAllowed), CameraError::PermissionDenied);
        assert_eq!(CameraError::from(MediaError::NotFound), CameraError::NoDevice);
        assert_eq!(
            CameraError::from(MediaError::NotReadable("busy".into())),
            CameraError::DeviceBusy
        );
        assert_eq!(CameraError::from(MediaError::Aborted), CameraError::DeviceBusy);
        assert_eq!(
            CameraError::from(MediaError::Overconstrained("facingMode".into())),
            CameraError::ConstraintsUnsatisfiable
        );
    }
}
