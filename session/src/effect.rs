//! Side effects requested by the session.

use juror_types::{
    CapturedPhoto, EditionId, Facing, GeoPoint, NationalId, OneTimeCode, PhoneNumber, PlateId,
    SessionToken, VoteDraft,
};

use crate::RequestId;

/// Work the caller performs on the session's behalf. Effects carrying a
/// [`RequestId`] must answer with the matching result event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPlate {
        request: RequestId,
        plate: PlateId,
        edition: EditionId,
    },
    RegisterChallenge {
        request: RequestId,
        national_id: NationalId,
    },
    RequestCode {
        request: RequestId,
        phone: PhoneNumber,
    },
    VerifyCode {
        request: RequestId,
        phone: PhoneNumber,
        code: OneTimeCode,
    },
    /// Deliver [`Event::TimerTick`](crate::Event::TimerTick) once per second.
    StartTicking,
    StopTicking,
    CheckExistingVote {
        request: RequestId,
        plate: PlateId,
        edition: EditionId,
        token: SessionToken,
    },
    StartCamera {
        request: RequestId,
        facing: Facing,
    },
    /// Release the camera. Idempotent.
    StopCamera,
    GrabFrame {
        request: RequestId,
    },
    FetchLocation {
        request: RequestId,
        center: GeoPoint,
    },
    CancelLocation,
    /// Run the content check; deliver
    /// [`Event::ProgressTick`](crate::Event::ProgressTick) while it is outstanding.
    AnalyzePhoto {
        request: RequestId,
        photo: CapturedPhoto,
    },
    CancelAnalysis,
    Submit {
        request: RequestId,
        draft: VoteDraft,
    },
}
