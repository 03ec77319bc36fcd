//! The voting session state machine.

use juror_capability::GeoError;
use juror_types::{
    CapturedPhoto, GeoFix, Plate, PlateId, SessionParams, SubmissionReceipt, VoteDraft,
};

use crate::{
    CaptureFlow, Effect, Event, IdentityFlow, RequestId, RequestSeq, ScoringFlow, ScoringStep,
    SessionError, VerifiedIdentity,
};

/// Top-level step of a session.
#[derive(Debug)]
pub enum Phase {
    /// Looking the plate up. `loading` is set while the lookup is outstanding.
    Entry { loading: Option<RequestId> },
    Identity(IdentityFlow),
    /// Plate shown; `checking` is set while the existing-vote query runs.
    PlateConfirm { checking: Option<RequestId> },
    Capture(CaptureFlow),
    Scoring(ScoringFlow),
    Submitting {
        scoring: ScoringFlow,
        request: RequestId,
    },
    Result(SubmissionReceipt),
    AlreadyVoted,
    /// The plate lookup failed. `Retry` starts over.
    Error,
    Abandoned,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Entry { .. } => "entry",
            Phase::Identity(_) => "identity",
            Phase::PlateConfirm { .. } => "plate_confirm",
            Phase::Capture(_) => "capture",
            Phase::Scoring(_) => "scoring",
            Phase::Submitting { .. } => "submitting",
            Phase::Result(_) => "result",
            Phase::AlreadyVoted => "already_voted",
            Phase::Error => "error",
            Phase::Abandoned => "abandoned",
        }
    }

    /// Result, already-voted and abandoned accept no further events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Result(_) | Phase::AlreadyVoted | Phase::Abandoned)
    }
}

/// Progress of the geolocation fetch started at plate confirmation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeoStatus {
    Idle,
    Pending(RequestId),
    Resolved(GeoFix),
    Failed(GeoError),
}

/// One juror's attempt to vote for one plate.
///
/// Owns every piece of session data. Feed it [`Event`]s through
/// [`handle`](Self::handle) and perform the returned [`Effect`]s.
#[derive(Debug)]
pub struct VotingSession {
    plate_id: PlateId,
    params: SessionParams,
    plate: Option<Plate>,
    identity: Option<VerifiedIdentity>,
    geo: GeoStatus,
    photo: Option<CapturedPhoto>,
    phase: Phase,
    notice: Option<SessionError>,
    seq: RequestSeq,
}

impl VotingSession {
    pub fn new(plate_id: PlateId, params: SessionParams) -> Self {
        Self {
            plate_id,
            params,
            plate: None,
            identity: None,
            geo: GeoStatus::Idle,
            photo: None,
            phase: Phase::Entry { loading: None },
            notice: None,
            seq: RequestSeq::default(),
        }
    }

    pub fn plate_id(&self) -> PlateId {
        self.plate_id
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn plate(&self) -> Option<&Plate> {
        self.plate.as_ref()
    }

    pub fn geo(&self) -> GeoStatus {
        self.geo
    }

    /// The problem raised by the last event, if any. Cleared by the next
    /// juror action.
    pub fn notice(&self) -> Option<&SessionError> {
        self.notice.as_ref()
    }

    pub fn is_verified(&self) -> bool {
        self.identity.is_some()
    }

    /// Photo that passed content analysis, held until scoring ends.
    pub fn approved_photo(&self) -> Option<&CapturedPhoto> {
        self.photo.as_ref()
    }

    pub fn can_resend(&self) -> bool {
        matches!(&self.phase, Phase::Identity(flow) if flow.can_resend())
    }

    pub fn can_submit(&self) -> bool {
        matches!(&self.phase, Phase::Scoring(flow) if flow.step() == ScoringStep::SubmitReview)
    }

    /// Why the session cannot move on to scoring because of location,
    /// if it cannot.
    pub fn location_blocker(&self) -> Option<SessionError> {
        match self.geo {
            GeoStatus::Resolved(fix) if !fix.in_radius => Some(SessionError::OutsideGeofence {
                distance_m: fix.distance_m,
                radius_m: self.params.geofence_radius_m,
            }),
            GeoStatus::Failed(e) => Some(SessionError::Location(e)),
            _ => None,
        }
    }

    /// Apply one event and return the effects to perform.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        if event.is_juror_action() {
            self.notice = None;
        }
        let mut fx = Vec::new();
        if let Err(e) = self.dispatch(event, &mut fx) {
            self.notice = Some(e);
        }
        fx
    }

    fn dispatch(&mut self, event: Event, fx: &mut Vec<Effect>) -> Result<(), SessionError> {
        match event {
            Event::Abandon => {
                self.finish(Phase::Abandoned, fx);
                Ok(())
            }
            Event::Begin | Event::Retry => {
                if matches!(self.phase, Phase::Entry { loading: None } | Phase::Error) {
                    let request = self.seq.next();
                    self.phase = Phase::Entry {
                        loading: Some(request),
                    };
                    fx.push(Effect::FetchPlate {
                        request,
                        plate: self.plate_id,
                        edition: self.params.edition_id,
                    });
                }
                Ok(())
            }
            Event::PlateLoaded { request, result } => {
                if !matches!(self.phase, Phase::Entry { loading: Some(r) } if r == request) {
                    return Ok(());
                }
                match result {
                    Ok(plate) => {
                        self.plate = Some(plate);
                        self.phase = Phase::Identity(IdentityFlow::new());
                        Ok(())
                    }
                    Err(e) => {
                        self.phase = Phase::Error;
                        Err(e.into())
                    }
                }
            }

            Event::SubmitNationalId(raw) => match &mut self.phase {
                Phase::Identity(flow) => {
                    fx.extend(flow.submit_national_id(&raw, &mut self.seq)?);
                    Ok(())
                }
                _ => Ok(()),
            },
            Event::ChallengeRegistered { request, result } => match &mut self.phase {
                Phase::Identity(flow) => {
                    fx.extend(flow.challenge_registered(request, result)?);
                    Ok(())
                }
                _ => Ok(()),
            },
            Event::SubmitPhone(raw) => match &mut self.phase {
                Phase::Identity(flow) => {
                    fx.extend(flow.submit_phone(&raw, &self.params, &mut self.seq)?);
                    Ok(())
                }
                _ => Ok(()),
            },
            Event::CodeDispatched { request, result } => match &mut self.phase {
                Phase::Identity(flow) => {
                    fx.extend(flow.code_dispatched(request, result, &self.params)?);
                    Ok(())
                }
                _ => Ok(()),
            },
            Event::EnterDigits(digits) => match &mut self.phase {
                Phase::Identity(flow) => {
                    fx.extend(flow.enter_digits(&digits, &mut self.seq)?);
                    Ok(())
                }
                _ => Ok(()),
            },
            Event::EraseDigit => {
                if let Phase::Identity(flow) = &mut self.phase {
                    flow.erase_digit();
                }
                Ok(())
            }
            Event::ResendCode => match &mut self.phase {
                Phase::Identity(flow) => {
                    fx.extend(flow.resend_code(&self.params, &mut self.seq)?);
                    Ok(())
                }
                _ => Ok(()),
            },
            Event::CodeVerified { request, result } => {
                let Phase::Identity(flow) = &mut self.phase else {
                    return Ok(());
                };
                fx.extend(flow.code_verified(request, result)?);
                if let Some(verified) = flow.take_verified() {
                    self.identity = Some(verified);
                    self.phase = Phase::PlateConfirm { checking: None };
                }
                Ok(())
            }
            Event::TimerTick => {
                match &mut self.phase {
                    Phase::Identity(flow) => fx.extend(flow.tick()),
                    // A tick that raced the end of identity.
                    _ => fx.push(Effect::StopTicking),
                }
                Ok(())
            }

            Event::Back => {
                match &mut self.phase {
                    Phase::Identity(flow) => fx.extend(flow.back()),
                    Phase::Scoring(flow) => flow.back(),
                    _ => {}
                }
                Ok(())
            }

            Event::ConfirmPlate => {
                self.confirm_plate(fx);
                Ok(())
            }
            Event::VoteChecked { request, result } => self.vote_checked(request, result, fx),

            Event::RetryCamera => {
                if let Phase::Capture(flow) = &mut self.phase {
                    flow.retry_camera(&mut self.seq, fx);
                }
                Ok(())
            }
            Event::SwitchFacing => {
                if let Phase::Capture(flow) = &mut self.phase {
                    flow.switch_facing(&mut self.seq, fx);
                }
                Ok(())
            }
            Event::CameraStarted { request, result } => match &mut self.phase {
                Phase::Capture(flow) => flow.camera_started(request, result),
                _ => Ok(()),
            },
            Event::CapturePhoto => {
                if let Phase::Capture(flow) = &mut self.phase {
                    flow.capture(&mut self.seq, fx);
                }
                Ok(())
            }
            Event::FrameGrabbed { request, result } => match &mut self.phase {
                Phase::Capture(flow) => flow.frame_grabbed(request, result, fx),
                _ => Ok(()),
            },
            Event::Retake => {
                if let Phase::Capture(flow) = &mut self.phase {
                    flow.retake(&mut self.seq, fx);
                }
                Ok(())
            }
            Event::UsePhoto => {
                if let Phase::Capture(flow) = &mut self.phase {
                    flow.use_photo(&mut self.seq, fx);
                }
                Ok(())
            }
            Event::ProgressTick => {
                if let Phase::Capture(flow) = &mut self.phase {
                    flow.progress_tick(self.params.analysis_progress_ceiling);
                }
                Ok(())
            }
            Event::AnalysisDone { request, result } => {
                if let Phase::Capture(flow) = &mut self.phase {
                    flow.analysis_done(request, result, &mut self.seq, fx)?;
                }
                self.try_enter_scoring(fx);
                self.check_location()
            }

            Event::RetryLocation => {
                self.retry_location(fx);
                Ok(())
            }
            Event::LocationResolved { request, result } => {
                if self.geo != GeoStatus::Pending(request) {
                    return Ok(());
                }
                self.geo = match result {
                    Ok(fix) => GeoStatus::Resolved(fix),
                    Err(e) => GeoStatus::Failed(e),
                };
                self.try_enter_scoring(fx);
                self.check_location()
            }

            Event::AdjustScore(steps) => {
                if let Phase::Scoring(flow) = &mut self.phase {
                    flow.adjust(steps);
                }
                Ok(())
            }
            Event::SetScore(value) => match &mut self.phase {
                Phase::Scoring(flow) => flow.set(value),
                _ => Ok(()),
            },
            Event::SetComment(raw) => match &mut self.phase {
                Phase::Scoring(flow) => flow.set_comment(&raw, self.params.comment_max_chars),
                _ => Ok(()),
            },
            Event::Next => {
                if let Phase::Scoring(flow) = &mut self.phase {
                    flow.next();
                }
                Ok(())
            }
            Event::Submit => {
                self.submit(fx);
                Ok(())
            }
            Event::Submitted { request, result } => self.submitted(request, result, fx),
        }
    }

    fn confirm_plate(&mut self, fx: &mut Vec<Effect>) {
        let Phase::PlateConfirm { checking: None } = self.phase else {
            return;
        };
        let Some(identity) = &self.identity else {
            return;
        };
        let request = self.seq.next();
        self.phase = Phase::PlateConfirm {
            checking: Some(request),
        };
        fx.push(Effect::CheckExistingVote {
            request,
            plate: self.plate_id,
            edition: self.params.edition_id,
            token: identity.token.clone(),
        });
    }

    fn vote_checked(
        &mut self,
        request: RequestId,
        result: Result<bool, juror_gateway::GatewayError>,
        fx: &mut Vec<Effect>,
    ) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::PlateConfirm { checking: Some(r) } if r == request) {
            return Ok(());
        }
        self.phase = Phase::PlateConfirm { checking: None };

        if result? {
            self.finish(Phase::AlreadyVoted, fx);
            return Ok(());
        }

        let flow = CaptureFlow::start(&mut self.seq, fx);
        self.phase = Phase::Capture(flow);
        self.fetch_location(fx);
        Ok(())
    }

    fn fetch_location(&mut self, fx: &mut Vec<Effect>) {
        let Some(plate) = &self.plate else {
            return;
        };
        let request = self.seq.next();
        self.geo = GeoStatus::Pending(request);
        fx.push(Effect::FetchLocation {
            request,
            center: plate.location,
        });
    }

    fn retry_location(&mut self, fx: &mut Vec<Effect>) {
        if !matches!(self.phase, Phase::Capture(_)) {
            return;
        }
        let settled_inside = matches!(self.geo, GeoStatus::Resolved(fix) if fix.in_radius);
        if settled_inside || matches!(self.geo, GeoStatus::Pending(_)) {
            return;
        }
        self.fetch_location(fx);
    }

    /// Surface the location problem, if there is one, as the notice.
    fn check_location(&self) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::Capture(_)) {
            return Ok(());
        }
        match self.location_blocker() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn try_enter_scoring(&mut self, fx: &mut Vec<Effect>) {
        let in_radius = matches!(self.geo, GeoStatus::Resolved(fix) if fix.in_radius);
        let Phase::Capture(flow) = &mut self.phase else {
            return;
        };
        if !in_radius {
            return;
        }
        let Some(photo) = flow.approved_photo().cloned() else {
            return;
        };
        flow.cancel(fx);
        self.photo = Some(photo);
        self.phase = Phase::Scoring(ScoringFlow::new());
    }

    fn submit(&mut self, fx: &mut Vec<Effect>) {
        if !self.can_submit() {
            return;
        }
        let (Some(identity), Some(photo)) = (&self.identity, &self.photo) else {
            return;
        };
        let Phase::Scoring(scoring) = std::mem::replace(&mut self.phase, Phase::Error) else {
            return;
        };
        let request = self.seq.next();
        fx.push(Effect::Submit {
            request,
            draft: VoteDraft {
                plate_id: self.plate_id,
                edition_id: self.params.edition_id,
                session_token: identity.token.clone(),
                photo: photo.clone(),
                scores: scoring.sheet().clone(),
            },
        });
        self.phase = Phase::Submitting { scoring, request };
    }

    fn submitted(
        &mut self,
        request: RequestId,
        result: Result<SubmissionReceipt, juror_gateway::GatewayError>,
        fx: &mut Vec<Effect>,
    ) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::Submitting { request: r, .. } if r == request) {
            return Ok(());
        }
        match result {
            Ok(receipt) => {
                self.finish(Phase::Result(receipt), fx);
                Ok(())
            }
            Err(e) => {
                let phase = std::mem::replace(&mut self.phase, Phase::Error);
                if let Phase::Submitting { scoring, .. } = phase {
                    self.phase = Phase::Scoring(scoring);
                }
                Err(e.into())
            }
        }
    }

    /// Move to a terminal phase: release everything still running and drop
    /// the vote data.
    fn finish(&mut self, terminal: Phase, fx: &mut Vec<Effect>) {
        match &mut self.phase {
            Phase::Identity(flow) => fx.extend(flow.cancel()),
            Phase::Capture(flow) => flow.cancel(fx),
            _ => {}
        }
        if matches!(self.geo, GeoStatus::Pending(_)) {
            fx.push(Effect::CancelLocation);
        }
        self.geo = GeoStatus::Idle;
        self.photo = None;
        self.identity = None;
        self.phase = terminal;
    }
}
