//! Session driver: executes effects on tokio and feeds results back.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use juror_capability::{GeolocationAdapter, MediaDevices, PositionSource};
use juror_gateway::Backend;
use juror_session::{Effect, Event, VotingSession};
use juror_types::PlateId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::{CameraHandle, RuntimeConfig};

/// Resend countdown period.
const TIMER_PERIOD: Duration = Duration::from_secs(1);

/// Runs one [`VotingSession`] against a backend and host capabilities.
///
/// Juror input enters through [`sender`](Self::sender); the driver's loop
/// ([`run`](Self::run) or [`step`](Self::step)) takes events one at a time,
/// applies them to the session and starts whatever work the session asks for.
pub struct SessionDriver<B: Backend, P: PositionSource + 'static> {
    session: VotingSession,
    backend: Arc<B>,
    geolocation: Arc<GeolocationAdapter<P>>,
    camera: Option<CameraHandle>,
    progress_interval: Duration,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    timer: Option<JoinHandle<()>>,
    progress: Option<JoinHandle<()>>,
    location: Option<JoinHandle<()>>,
    analysis: Option<JoinHandle<()>>,
}

impl<B: Backend, P: PositionSource + 'static> SessionDriver<B, P> {
    /// Must be called inside a tokio runtime: the camera actor is spawned here.
    pub fn new<D: MediaDevices + 'static>(
        plate: PlateId,
        config: &RuntimeConfig,
        backend: B,
        devices: D,
        position: P,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let camera = CameraHandle::spawn(devices, events_tx.clone());
        let geolocation = GeolocationAdapter::new(
            position,
            config.geofence_radius_m,
            config.geolocation_timeout(),
        );
        Self {
            session: VotingSession::new(plate, config.session_params()),
            backend: Arc::new(backend),
            geolocation: Arc::new(geolocation),
            camera: Some(camera),
            progress_interval: config.progress_interval(),
            events_tx,
            events_rx,
            timer: None,
            progress: None,
            location: None,
            analysis: None,
        }
    }

    pub fn session(&self) -> &VotingSession {
        &self.session
    }

    /// Channel for juror input. Events sent here are handled in order with
    /// every other result.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.events_tx.clone()
    }

    /// Kick off the session (plate lookup).
    pub fn begin(&mut self) {
        self.dispatch(Event::Begin);
    }

    /// Apply `event` to the session and perform the resulting effects.
    pub fn dispatch(&mut self, event: Event) {
        if matches!(event, Event::AnalysisDone { .. }) {
            Self::abort(&mut self.progress);
            self.analysis = None;
        }

        let before = self.session.phase().name();
        let had_notice = self.session.notice().is_some();
        let effects = self.session.handle(event);
        let after = self.session.phase().name();

        if before != after {
            tracing::info!(
                plate = %self.session.plate_id(),
                from = before,
                to = after,
                "session phase changed"
            );
        }
        if let Some(notice) = self.session.notice() {
            if !had_notice || before != after {
                tracing::warn!(kind = ?notice.kind(), %notice, "session notice");
            }
        }

        for effect in effects {
            self.perform(effect);
        }
    }

    /// Wait for the next event and dispatch it. `false` once the session is
    /// terminal or no further events can arrive.
    pub async fn step(&mut self) -> bool {
        if self.session.phase().is_terminal() {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.dispatch(event);
                !self.session.phase().is_terminal()
            }
            None => false,
        }
    }

    /// Process events until the session is terminal, calling `observe`
    /// after each one.
    pub async fn run(&mut self, mut observe: impl FnMut(&VotingSession)) {
        observe(&self.session);
        while self.step().await {
            observe(&self.session);
        }
        observe(&self.session);
        self.shutdown().await;
    }

    /// Process events until `done` holds for the session or it turns terminal.
    pub async fn run_until(&mut self, done: impl Fn(&VotingSession) -> bool) {
        while !done(&self.session) && self.step().await {}
    }

    /// Stop every task and release the camera.
    pub async fn shutdown(&mut self) {
        for handle in [
            &mut self.timer,
            &mut self.progress,
            &mut self.location,
            &mut self.analysis,
        ] {
            Self::abort(handle);
        }
        if let Some(camera) = self.camera.take() {
            camera.stop();
            camera.shutdown().await;
        }
    }

    fn perform(&mut self, effect: Effect) {
        tracing::debug!(?effect, "performing effect");
        match effect {
            Effect::FetchPlate {
                request,
                plate,
                edition,
            } => {
                let backend = self.backend.clone();
                self.spawn_call(async move {
                    Event::PlateLoaded {
                        request,
                        result: backend.fetch_plate(plate, edition).await,
                    }
                });
            }
            Effect::RegisterChallenge {
                request,
                national_id,
            } => {
                let backend = self.backend.clone();
                self.spawn_call(async move {
                    Event::ChallengeRegistered {
                        request,
                        result: backend.register_challenge(&national_id).await,
                    }
                });
            }
            Effect::RequestCode { request, phone } => {
                let backend = self.backend.clone();
                self.spawn_call(async move {
                    Event::CodeDispatched {
                        request,
                        result: backend.request_code(&phone).await,
                    }
                });
            }
            Effect::VerifyCode {
                request,
                phone,
                code,
            } => {
                let backend = self.backend.clone();
                self.spawn_call(async move {
                    Event::CodeVerified {
                        request,
                        result: backend.verify_code(&phone, &code).await,
                    }
                });
            }
            Effect::StartTicking => {
                Self::abort(&mut self.timer);
                self.timer = Some(self.spawn_ticker(TIMER_PERIOD, Event::TimerTick));
            }
            Effect::StopTicking => Self::abort(&mut self.timer),
            Effect::CheckExistingVote {
                request,
                plate,
                edition,
                token,
            } => {
                let backend = self.backend.clone();
                self.spawn_call(async move {
                    Event::VoteChecked {
                        request,
                        result: backend.has_voted(plate, edition, Some(&token)).await,
                    }
                });
            }
            Effect::StartCamera { request, facing } => {
                if let Some(camera) = &self.camera {
                    camera.start(request, facing);
                }
            }
            Effect::StopCamera => {
                if let Some(camera) = &self.camera {
                    camera.stop();
                }
            }
            Effect::GrabFrame { request } => {
                if let Some(camera) = &self.camera {
                    camera.grab(request);
                }
            }
            Effect::FetchLocation { request, center } => {
                Self::abort(&mut self.location);
                let geolocation = self.geolocation.clone();
                self.location = Some(self.spawn_call(async move {
                    Event::LocationResolved {
                        request,
                        result: geolocation.fetch(center).await,
                    }
                }));
            }
            Effect::CancelLocation => Self::abort(&mut self.location),
            Effect::AnalyzePhoto { request, photo } => {
                Self::abort(&mut self.analysis);
                let backend = self.backend.clone();
                self.analysis = Some(self.spawn_call(async move {
                    Event::AnalysisDone {
                        request,
                        result: backend.analyze(&photo).await,
                    }
                }));
                Self::abort(&mut self.progress);
                let ticker = self.spawn_ticker(self.progress_interval, Event::ProgressTick);
                self.progress = Some(ticker);
            }
            Effect::CancelAnalysis => {
                Self::abort(&mut self.analysis);
                Self::abort(&mut self.progress);
            }
            Effect::Submit { request, draft } => {
                tracing::info!(
                    plate = %draft.plate_id,
                    edition = %draft.edition_id,
                    mean = draft.scores.mean(),
                    "submitting vote"
                );
                let backend = self.backend.clone();
                self.spawn_call(async move {
                    Event::Submitted {
                        request,
                        result: backend.submit(&draft).await,
                    }
                });
            }
        }
    }

    /// Run `call` as its own task and post its event when it finishes.
    fn spawn_call<F>(&self, call: F) -> JoinHandle<()>
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let event = call.await;
            let _ = events.send(event);
        })
    }

    /// Post `event` every `period`, starting one period from now.
    fn spawn_ticker(&self, period: Duration, event: Event) -> JoinHandle<()> {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(event.clone()).is_err() {
                    break;
                }
            }
        })
    }

    fn abort(handle: &mut Option<JoinHandle<()>>) {
        if let Some(handle) = handle.take() {
            handle.abort();
        }
    }
}

impl<B: Backend, P: PositionSource + 'static> Drop for SessionDriver<B, P> {
    fn drop(&mut self) {
        for handle in [
            &mut self.timer,
            &mut self.progress,
            &mut self.location,
            &mut self.analysis,
        ] {
            Self::abort(handle);
        }
    }
}
