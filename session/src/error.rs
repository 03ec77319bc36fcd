//! Recoverable problems surfaced to the juror.

use juror_capability::{CameraError, GeoError};
use juror_gateway::GatewayError;
use juror_types::TypesError;
use thiserror::Error;

/// Broad category, deciding how the problem is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; the juror retypes.
    Validation,
    /// Camera or location failure; a manual retry is offered.
    Capability,
    /// A backend call failed; retry is offered, nothing advanced.
    Service,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("invalid ID")]
    InvalidNationalId,

    #[error("invalid phone number")]
    InvalidPhone,

    #[error("invalid code")]
    InvalidCode,

    #[error("invalid code")]
    CodeRejected,

    #[error("a new code can be requested in {0}s")]
    ResendNotReady(u32),

    #[error("camera: {0}")]
    Camera(#[from] CameraError),

    #[error("location: {0}")]
    Location(#[from] GeoError),

    #[error("you are {distance_m:.0} m from the restaurant; votes are accepted within {radius_m:.0} m")]
    OutsideGeofence { distance_m: f64, radius_m: f64 },

    #[error("could not capture photo: {0}")]
    Capture(TypesError),

    #[error("photo was not accepted: {0}")]
    PhotoRejected(String),

    #[error("score must be between 1.0 and 5.0")]
    ScoreOutOfRange,

    #[error("comment is limited to {max} characters ({len} given)")]
    CommentTooLong { len: usize, max: usize },

    #[error("{0}")]
    Service(GatewayError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::InvalidNationalId
            | SessionError::InvalidPhone
            | SessionError::InvalidCode
            | SessionError::CodeRejected
            | SessionError::ResendNotReady(_)
            | SessionError::ScoreOutOfRange
            | SessionError::CommentTooLong { .. } => ErrorKind::Validation,
            SessionError::Camera(_)
            | SessionError::Location(_)
            | SessionError::OutsideGeofence { .. }
            | SessionError::Capture(_) => ErrorKind::Capability,
            SessionError::PhotoRejected(_) | SessionError::Service(_) => ErrorKind::Service,
        }
    }
}

impl From<GatewayError> for SessionError {
    fn from(e: GatewayError) -> Self {
        SessionError::Service(e)
    }
}
