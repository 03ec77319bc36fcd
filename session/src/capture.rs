//! Capture subflow: await camera, framing, review, content analysis.

use juror_capability::CameraError;
use juror_gateway::GatewayError;
use juror_types::{CapturedPhoto, Facing, Frame};

use crate::{crop, Effect, RequestId, RequestSeq, SessionError};

/// Where the capture subflow stands.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureStep {
    /// Waiting for a stream. `failure` holds the last start error, if any;
    /// a retry is offered while it is set.
    AwaitCamera { failure: Option<CameraError> },
    /// Live stream is up.
    Framing,
    /// A still has been taken and the stream released.
    Review { photo: CapturedPhoto },
    /// The still is with the content analyzer.
    Analyzing { photo: CapturedPhoto, progress: u8 },
    /// The analyzer accepted the still.
    Approved { photo: CapturedPhoto },
}

#[derive(Debug)]
pub struct CaptureFlow {
    step: CaptureStep,
    facing: Facing,
    camera_request: Option<RequestId>,
    grab_request: Option<RequestId>,
    analysis_request: Option<RequestId>,
}

impl CaptureFlow {
    /// Enter the subflow and ask for the back camera.
    pub fn start(seq: &mut RequestSeq, fx: &mut Vec<Effect>) -> Self {
        let mut flow = Self {
            step: CaptureStep::AwaitCamera { failure: None },
            facing: Facing::Back,
            camera_request: None,
            grab_request: None,
            analysis_request: None,
        };
        flow.request_camera(seq, fx);
        flow
    }

    pub fn step(&self) -> &CaptureStep {
        &self.step
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Analysis progress in percent, once the photo has been handed over.
    pub fn progress(&self) -> Option<u8> {
        match self.step {
            CaptureStep::Analyzing { progress, .. } => Some(progress),
            CaptureStep::Approved { .. } => Some(100),
            _ => None,
        }
    }

    pub fn approved_photo(&self) -> Option<&CapturedPhoto> {
        match &self.step {
            CaptureStep::Approved { photo } => Some(photo),
            _ => None,
        }
    }

    fn request_camera(&mut self, seq: &mut RequestSeq, fx: &mut Vec<Effect>) {
        let request = seq.next();
        self.camera_request = Some(request);
        self.grab_request = None;
        self.step = CaptureStep::AwaitCamera { failure: None };
        fx.push(Effect::StartCamera {
            request,
            facing: self.facing,
        });
    }

    pub fn camera_started(
        &mut self,
        request: RequestId,
        result: Result<Facing, CameraError>,
    ) -> Result<(), SessionError> {
        if self.camera_request != Some(request) {
            return Ok(());
        }
        self.camera_request = None;
        match result {
            Ok(facing) => {
                self.facing = facing;
                self.step = CaptureStep::Framing;
                Ok(())
            }
            Err(e) => {
                self.step = CaptureStep::AwaitCamera { failure: Some(e) };
                Err(SessionError::Camera(e))
            }
        }
    }

    /// Manual retry after a failed start. Supersedes a start still pending.
    pub fn retry_camera(&mut self, seq: &mut RequestSeq, fx: &mut Vec<Effect>) {
        if matches!(self.step, CaptureStep::AwaitCamera { .. }) {
            self.request_camera(seq, fx);
        }
    }

    /// Re-acquire the camera with the other facing mode.
    pub fn switch_facing(&mut self, seq: &mut RequestSeq, fx: &mut Vec<Effect>) {
        if matches!(
            self.step,
            CaptureStep::Framing | CaptureStep::AwaitCamera { .. }
        ) {
            self.facing = self.facing.opposite();
            self.request_camera(seq, fx);
        }
    }

    pub fn capture(&mut self, seq: &mut RequestSeq, fx: &mut Vec<Effect>) {
        if self.step != CaptureStep::Framing || self.grab_request.is_some() {
            return;
        }
        let request = seq.next();
        self.grab_request = Some(request);
        fx.push(Effect::GrabFrame { request });
    }

    pub fn frame_grabbed(
        &mut self,
        request: RequestId,
        result: Result<Frame, CameraError>,
        fx: &mut Vec<Effect>,
    ) -> Result<(), SessionError> {
        if self.grab_request != Some(request) {
            return Ok(());
        }
        self.grab_request = None;

        let frame = match result {
            Ok(frame) => frame,
            Err(e) => {
                fx.push(Effect::StopCamera);
                self.step = CaptureStep::AwaitCamera { failure: Some(e) };
                return Err(SessionError::Camera(e));
            }
        };
        let photo = crop::normalize(frame).map_err(SessionError::Capture)?;
        fx.push(Effect::StopCamera);
        self.step = CaptureStep::Review { photo };
        Ok(())
    }

    /// Discard the still and go back to a live stream.
    pub fn retake(&mut self, seq: &mut RequestSeq, fx: &mut Vec<Effect>) {
        if matches!(self.step, CaptureStep::Review { .. }) {
            self.request_camera(seq, fx);
        }
    }

    pub fn use_photo(&mut self, seq: &mut RequestSeq, fx: &mut Vec<Effect>) {
        let CaptureStep::Review { photo } = &self.step else {
            return;
        };
        let photo = photo.clone();
        let request = seq.next();
        self.analysis_request = Some(request);
        fx.push(Effect::AnalyzePhoto {
            request,
            photo: photo.clone(),
        });
        self.step = CaptureStep::Analyzing { photo, progress: 0 };
    }

    /// Advance the progress indicator a quarter of the way to `ceiling`,
    /// by at least one point, never past it.
    pub fn progress_tick(&mut self, ceiling: u8) {
        if let CaptureStep::Analyzing { progress, .. } = &mut self.step {
            let ceiling = ceiling.min(99);
            if *progress < ceiling {
                let gap = ceiling - *progress;
                *progress += gap.div_ceil(4).max(1);
            }
        }
    }

    pub fn analysis_done(
        &mut self,
        request: RequestId,
        result: Result<(), GatewayError>,
        seq: &mut RequestSeq,
        fx: &mut Vec<Effect>,
    ) -> Result<(), SessionError> {
        if self.analysis_request != Some(request) {
            return Ok(());
        }
        self.analysis_request = None;
        let step = std::mem::replace(&mut self.step, CaptureStep::AwaitCamera { failure: None });
        let CaptureStep::Analyzing { photo, .. } = step else {
            self.step = step;
            return Ok(());
        };

        match result {
            Ok(()) => {
                self.step = CaptureStep::Approved { photo };
                Ok(())
            }
            Err(e) => {
                // The photo is dropped; capture starts over.
                self.request_camera(seq, fx);
                Err(match e {
                    GatewayError::Rejected(reason) => SessionError::PhotoRejected(reason),
                    other => SessionError::Service(other),
                })
            }
        }
    }

    /// Leave the subflow: release the camera and drop outstanding work.
    pub fn cancel(&mut self, fx: &mut Vec<Effect>) {
        fx.push(Effect::StopCamera);
        if self.analysis_request.take().is_some() {
            fx.push(Effect::CancelAnalysis);
        }
        self.camera_request = None;
        self.grab_request = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seq: &mut RequestSeq) -> (CaptureFlow, RequestId) {
        let mut fx = Vec::new();
        let flow = CaptureFlow::start(seq, &mut fx);
        match fx[..] {
            [Effect::StartCamera {
                request,
                facing: Facing::Back,
            }] => (flow, request),
            _ => panic!("unexpected effects {fx:?}"),
        }
    }

    fn framing(seq: &mut RequestSeq) -> CaptureFlow {
        let (mut flow, request) = started(seq);
        flow.camera_started(request, Ok(Facing::Back)).unwrap();
        assert_eq!(flow.step(), &CaptureStep::Framing);
        flow
    }

    fn grab(flow: &mut CaptureFlow, seq: &mut RequestSeq) -> RequestId {
        let mut fx = Vec::new();
        flow.capture(seq, &mut fx);
        match fx[..] {
            [Effect::GrabFrame { request }] => request,
            _ => panic!("unexpected effects {fx:?}"),
        }
    }

    fn in_review(seq: &mut RequestSeq) -> CaptureFlow {
        let mut flow = framing(seq);
        let request = grab(&mut flow, seq);
        let mut fx = Vec::new();
        flow.frame_grabbed(request, Ok(Frame::solid(640, 480, [9, 9, 9, 255])), &mut fx)
            .unwrap();
        assert_eq!(fx, vec![Effect::StopCamera]);
        flow
    }

    #[test]
    fn camera_failure_offers_retry() {
        let mut seq = RequestSeq::default();
        let (mut flow, request) = started(&mut seq);
        let err = flow
            .camera_started(request, Err(CameraError::PermissionDenied))
            .unwrap_err();
        assert_eq!(err, SessionError::Camera(CameraError::PermissionDenied));
        assert_eq!(
            flow.step(),
            &CaptureStep::AwaitCamera {
                failure: Some(CameraError::PermissionDenied)
            }
        );

        let mut fx = Vec::new();
        flow.retry_camera(&mut seq, &mut fx);
        assert!(matches!(fx[..], [Effect::StartCamera { facing: Facing::Back, .. }]));
        assert_eq!(flow.step(), &CaptureStep::AwaitCamera { failure: None });
    }

    #[test]
    fn superseded_camera_start_is_ignored() {
        let mut seq = RequestSeq::default();
        let (mut flow, first) = started(&mut seq);
        let mut fx = Vec::new();
        flow.switch_facing(&mut seq, &mut fx);
        let Effect::StartCamera { request: second, facing } = fx[0].clone() else {
            panic!("expected a camera start");
        };
        assert_eq!(facing, Facing::Front);

        flow.camera_started(first, Ok(Facing::Back)).unwrap();
        assert_eq!(flow.step(), &CaptureStep::AwaitCamera { failure: None });
        flow.camera_started(second, Ok(Facing::Front)).unwrap();
        assert_eq!(flow.step(), &CaptureStep::Framing);
        assert_eq!(flow.facing(), Facing::Front);
    }

    #[test]
    fn capture_crops_and_releases_camera() {
        let mut seq = RequestSeq::default();
        let flow = in_review(&mut seq);
        let CaptureStep::Review { photo } = flow.step() else {
            panic!("expected review");
        };
        assert_eq!((photo.width(), photo.height()), (360, 480));
    }

    #[test]
    fn only_one_grab_at_a_time() {
        let mut seq = RequestSeq::default();
        let mut flow = framing(&mut seq);
        grab(&mut flow, &mut seq);
        let mut fx = Vec::new();
        flow.capture(&mut seq, &mut fx);
        assert!(fx.is_empty());
    }

    #[test]
    fn retake_restarts_camera() {
        let mut seq = RequestSeq::default();
        let mut flow = in_review(&mut seq);
        let mut fx = Vec::new();
        flow.retake(&mut seq, &mut fx);
        assert!(matches!(fx[..], [Effect::StartCamera { .. }]));
        assert!(flow.approved_photo().is_none());
    }

    #[test]
    fn progress_is_monotonic_and_capped() {
        let mut seq = RequestSeq::default();
        let mut flow = in_review(&mut seq);
        let mut fx = Vec::new();
        flow.use_photo(&mut seq, &mut fx);
        assert!(matches!(fx[..], [Effect::AnalyzePhoto { .. }]));
        assert_eq!(flow.progress(), Some(0));

        let mut last = 0;
        for _ in 0..100 {
            flow.progress_tick(95);
            let now = flow.progress().unwrap();
            assert!(now >= last);
            assert!(now <= 95);
            last = now;
        }
        assert_eq!(last, 95);
    }

    #[test]
    fn approved_photo_reports_full_progress() {
        let mut seq = RequestSeq::default();
        let mut flow = in_review(&mut seq);
        let mut fx = Vec::new();
        flow.use_photo(&mut seq, &mut fx);
        let Effect::AnalyzePhoto { request, .. } = fx[0].clone() else {
            panic!("expected analysis");
        };
        flow.analysis_done(request, Ok(()), &mut seq, &mut Vec::new())
            .unwrap();
        assert_eq!(flow.progress(), Some(100));
        assert!(flow.approved_photo().is_some());
    }

    #[test]
    fn rejected_photo_goes_back_to_camera() {
        let mut seq = RequestSeq::default();
        let mut flow = in_review(&mut seq);
        let mut fx = Vec::new();
        flow.use_photo(&mut seq, &mut fx);
        let Effect::AnalyzePhoto { request, .. } = fx[0].clone() else {
            panic!("expected analysis");
        };
        let mut fx = Vec::new();
        let err = flow
            .analysis_done(
                request,
                Err(GatewayError::Rejected("blurry".into())),
                &mut seq,
                &mut fx,
            )
            .unwrap_err();
        assert_eq!(err, SessionError::PhotoRejected("blurry".into()));
        assert!(matches!(fx[..], [Effect::StartCamera { .. }]));
        assert_eq!(flow.step(), &CaptureStep::AwaitCamera { failure: None });
    }

    #[test]
    fn cancel_stops_camera_and_analysis() {
        let mut seq = RequestSeq::default();
        let mut flow = in_review(&mut seq);
        flow.use_photo(&mut seq, &mut Vec::new());
        let mut fx = Vec::new();
        flow.cancel(&mut fx);
        assert_eq!(fx, vec![Effect::StopCamera, Effect::CancelAnalysis]);
    }
}
