//! Nullable backend: every gateway collaborator in memory.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use juror_gateway::{
    ContentAnalyzer, GatewayError, OtpService, PlateLookup, SubmissionGateway, VoteRegistry,
};
use juror_types::{
    CapturedPhoto, EditionId, GeoPoint, NationalId, OneTimeCode, PhoneNumber, Plate, PlateId,
    SessionToken, SubmissionReceipt, VoteDraft,
};

use crate::lock;

/// Code accepted by a fresh [`NullBackend`].
pub const DEFAULT_CODE: &str = "123456";

/// The collaborator calls a [`NullBackend`] counts and can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendCall {
    RegisterChallenge,
    RequestCode,
    VerifyCode,
    FetchPlate,
    HasVoted,
    Analyze,
    Submit,
}

#[derive(Default)]
struct BackendState {
    plates: HashMap<(PlateId, EditionId), Plate>,
    valid_code: String,
    /// `(token, plate, edition)` of every accepted vote.
    votes: HashSet<(String, PlateId, EditionId)>,
    submitted: Vec<VoteDraft>,
    dispatched: Vec<PhoneNumber>,
    failures: HashMap<BackendCall, VecDeque<GatewayError>>,
    calls: HashMap<BackendCall, usize>,
    latency: HashMap<BackendCall, Duration>,
    badge: Option<String>,
}

/// An in-memory stand-in for the whole circuit backend.
///
/// Accepts [`DEFAULT_CODE`] for any phone, issues a token derived from the
/// phone number, and remembers accepted votes so a second vote from the
/// same token for the same plate and edition is rejected.
#[derive(Clone)]
pub struct NullBackend {
    state: Arc<Mutex<BackendState>>,
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                valid_code: DEFAULT_CODE.to_string(),
                ..BackendState::default()
            })),
        }
    }

    /// Register `plate` for `edition`.
    pub fn with_plate(self, plate: Plate, edition: EditionId) -> Self {
        lock(&self.state).plates.insert((plate.id, edition), plate);
        self
    }

    /// A sample plate served at `location`.
    pub fn sample_plate(id: PlateId, location: GeoPoint) -> Plate {
        Plate {
            id,
            name: "Moqueca capixaba".into(),
            restaurant: "Casa do Mar".into(),
            category: "Seafood".into(),
            photo_url: format!("https://img.example/plates/{id}.jpg"),
            location,
        }
    }

    pub fn set_valid_code(&self, code: &str) {
        lock(&self.state).valid_code = code.to_string();
    }

    /// Badge returned with the next accepted votes.
    pub fn set_badge(&self, badge: Option<&str>) {
        lock(&self.state).badge = badge.map(str::to_string);
    }

    /// Fail the next `call` with `error`. Failures queue up per call.
    pub fn fail_next(&self, call: BackendCall, error: GatewayError) {
        lock(&self.state)
            .failures
            .entry(call)
            .or_default()
            .push_back(error);
    }

    /// Delay every `call` by `latency` before answering.
    pub fn set_latency(&self, call: BackendCall, latency: Duration) {
        lock(&self.state).latency.insert(call, latency);
    }

    /// Record a vote as if it had been accepted earlier.
    pub fn record_vote(&self, token: &str, plate: PlateId, edition: EditionId) {
        lock(&self.state)
            .votes
            .insert((token.to_string(), plate, edition));
    }

    /// Token issued after verifying `phone`.
    pub fn token_for(phone: &PhoneNumber) -> String {
        format!("null-token-{}", phone.national_digits())
    }

    pub fn calls(&self, call: BackendCall) -> usize {
        lock(&self.state).calls.get(&call).copied().unwrap_or(0)
    }

    /// Every accepted draft, in order.
    pub fn submitted(&self) -> Vec<VoteDraft> {
        lock(&self.state).submitted.clone()
    }

    /// Every phone a code was sent to, in order.
    pub fn dispatched(&self) -> Vec<PhoneNumber> {
        lock(&self.state).dispatched.clone()
    }

    /// Count the call, wait out its latency, then return the scripted
    /// failure if one is queued.
    async fn enter(&self, call: BackendCall) -> Result<(), GatewayError> {
        let latency = {
            let mut state = lock(&self.state);
            *state.calls.entry(call).or_default() += 1;
            state.latency.get(&call).copied().unwrap_or_default()
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let failure = lock(&self.state)
            .failures
            .get_mut(&call)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl OtpService for NullBackend {
    async fn register_challenge(&self, _id: &NationalId) -> Result<(), GatewayError> {
        self.enter(BackendCall::RegisterChallenge).await
    }

    async fn request_code(&self, phone: &PhoneNumber) -> Result<(), GatewayError> {
        self.enter(BackendCall::RequestCode).await?;
        lock(&self.state).dispatched.push(phone.clone());
        Ok(())
    }

    async fn verify_code(
        &self,
        phone: &PhoneNumber,
        code: &OneTimeCode,
    ) -> Result<SessionToken, GatewayError> {
        self.enter(BackendCall::VerifyCode).await?;
        let valid = lock(&self.state).valid_code == code.as_str();
        if !valid {
            return Err(GatewayError::Rejected("invalid code".into()));
        }
        Ok(SessionToken::new(Self::token_for(phone)))
    }
}

impl PlateLookup for NullBackend {
    async fn fetch_plate(&self, plate: PlateId, edition: EditionId) -> Result<Plate, GatewayError> {
        self.enter(BackendCall::FetchPlate).await?;
        lock(&self.state)
            .plates
            .get(&(plate, edition))
            .cloned()
            .ok_or(GatewayError::Status(404))
    }
}

impl VoteRegistry for NullBackend {
    async fn has_voted(
        &self,
        plate: PlateId,
        edition: EditionId,
        token: Option<&SessionToken>,
    ) -> Result<bool, GatewayError> {
        self.enter(BackendCall::HasVoted).await?;
        let Some(token) = token else {
            return Ok(false);
        };
        Ok(lock(&self.state)
            .votes
            .contains(&(token.expose().to_string(), plate, edition)))
    }
}

impl ContentAnalyzer for NullBackend {
    async fn analyze(&self, _photo: &CapturedPhoto) -> Result<(), GatewayError> {
        self.enter(BackendCall::Analyze).await
    }
}

impl SubmissionGateway for NullBackend {
    async fn submit(&self, draft: &VoteDraft) -> Result<SubmissionReceipt, GatewayError> {
        self.enter(BackendCall::Submit).await?;
        let mut state = lock(&self.state);
        let key = (
            draft.session_token.expose().to_string(),
            draft.plate_id,
            draft.edition_id,
        );
        if !state.votes.insert(key) {
            return Err(GatewayError::Rejected("vote already recorded".into()));
        }
        state.submitted.push(draft.clone());
        Ok(SubmissionReceipt {
            ranking_position: state.submitted.len() as u32,
            badge_unlocked: state.badge.clone(),
        })
    }
}
