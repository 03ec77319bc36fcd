//! Inputs to the session: juror actions and results of earlier effects.

use juror_capability::{CameraError, GeoError};
use juror_gateway::GatewayError;
use juror_types::{Facing, Frame, GeoFix, Plate, SessionToken, SubmissionReceipt};

use crate::RequestId;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // ── Juror actions ───────────────────────────────────────────────────
    /// Open the session: look the plate up.
    Begin,
    /// Retry after the session landed in the error state.
    Retry,
    SubmitNationalId(String),
    SubmitPhone(String),
    /// Append digits to the code buffer; verification fires at six.
    EnterDigits(String),
    EraseDigit,
    ResendCode,
    /// Go back one step (phone to ID, or to the previous scoring screen).
    Back,
    ConfirmPlate,
    RetryCamera,
    SwitchFacing,
    CapturePhoto,
    Retake,
    UsePhoto,
    RetryLocation,
    /// Move the current criterion by this many tenths.
    AdjustScore(i32),
    SetScore(f64),
    SetComment(String),
    Next,
    Submit,
    Abandon,

    // ── Clock ───────────────────────────────────────────────────────────
    /// One second elapsed on the resend countdown.
    TimerTick,
    /// The analysis progress indicator should advance.
    ProgressTick,

    // ── Results ─────────────────────────────────────────────────────────
    PlateLoaded {
        request: RequestId,
        result: Result<Plate, GatewayError>,
    },
    ChallengeRegistered {
        request: RequestId,
        result: Result<(), GatewayError>,
    },
    CodeDispatched {
        request: RequestId,
        result: Result<(), GatewayError>,
    },
    CodeVerified {
        request: RequestId,
        result: Result<SessionToken, GatewayError>,
    },
    VoteChecked {
        request: RequestId,
        result: Result<bool, GatewayError>,
    },
    CameraStarted {
        request: RequestId,
        result: Result<Facing, CameraError>,
    },
    FrameGrabbed {
        request: RequestId,
        result: Result<Frame, CameraError>,
    },
    LocationResolved {
        request: RequestId,
        result: Result<GeoFix, GeoError>,
    },
    AnalysisDone {
        request: RequestId,
        result: Result<(), GatewayError>,
    },
    Submitted {
        request: RequestId,
        result: Result<SubmissionReceipt, GatewayError>,
    },
}

impl Event {
    /// Whether the juror caused this event directly. Juror input clears the
    /// previous notice.
    pub fn is_juror_action(&self) -> bool {
        !matches!(
            self,
            Event::TimerTick
                | Event::ProgressTick
                | Event::PlateLoaded { .. }
                | Event::ChallengeRegistered { .. }
                | Event::CodeDispatched { .. }
                | Event::CodeVerified { .. }
                | Event::VoteChecked { .. }
                | Event::CameraStarted { .. }
                | Event::FrameGrabbed { .. }
                | Event::LocationResolved { .. }
                | Event::AnalysisDone { .. }
                | Event::Submitted { .. }
        )
    }
}
