//! Identity verification subflow: ID entry, phone entry, code entry, verified.

use juror_capability::{CountdownTimer, Tick};
use juror_gateway::GatewayError;
use juror_types::{NationalId, OneTimeCode, PhoneNumber, SessionParams, SessionToken};

use crate::{Effect, RequestId, RequestSeq, SessionError};

/// Steps of the identity subflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityStep {
    IdEntry,
    PhoneEntry,
    CodeEntry,
    Verified,
}

/// The single call the subflow may have outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Challenge(RequestId),
    Dispatch(RequestId),
    Verify(RequestId),
}

/// A token together with the phone number it was issued for.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifiedIdentity {
    pub national_id: NationalId,
    pub phone: PhoneNumber,
    pub token: SessionToken,
}

#[derive(Debug)]
pub struct IdentityFlow {
    step: IdentityStep,
    national_id: Option<NationalId>,
    phone: Option<PhoneNumber>,
    code: String,
    timer: CountdownTimer,
    pending: Option<Pending>,
    verified: Option<VerifiedIdentity>,
}

impl Default for IdentityFlow {
    fn default() -> Self {
        Self {
            step: IdentityStep::IdEntry,
            national_id: None,
            phone: None,
            code: String::new(),
            timer: CountdownTimer::new(),
            pending: None,
            verified: None,
        }
    }
}

impl IdentityFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> IdentityStep {
        self.step
    }

    /// Digits typed so far in code entry.
    pub fn code_buffer(&self) -> &str {
        &self.code
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Seconds until "resend code" is enabled.
    pub fn resend_remaining(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn can_resend(&self) -> bool {
        self.step == IdentityStep::CodeEntry && !self.timer.is_running() && self.pending.is_none()
    }

    /// Hand over the verified identity. Only `Some` once, after verification.
    pub fn take_verified(&mut self) -> Option<VerifiedIdentity> {
        self.verified.take()
    }

    /// Stop the resend countdown when the subflow is left early.
    pub fn cancel(&mut self) -> Vec<Effect> {
        self.pending = None;
        if self.timer.is_running() {
            self.timer.cancel();
            return vec![Effect::StopTicking];
        }
        Vec::new()
    }

    pub fn submit_national_id(
        &mut self,
        raw: &str,
        seq: &mut RequestSeq,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.step != IdentityStep::IdEntry || self.pending.is_some() {
            return Ok(Vec::new());
        }
        let national_id = NationalId::parse(raw).map_err(|_| SessionError::InvalidNationalId)?;
        let request = seq.next();
        self.pending = Some(Pending::Challenge(request));
        self.national_id = Some(national_id.clone());
        Ok(vec![Effect::RegisterChallenge {
            request,
            national_id,
        }])
    }

    pub fn challenge_registered(
        &mut self,
        request: RequestId,
        result: Result<(), GatewayError>,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.pending != Some(Pending::Challenge(request)) {
            return Ok(Vec::new());
        }
        self.pending = None;
        result?;
        self.step = IdentityStep::PhoneEntry;
        Ok(Vec::new())
    }

    pub fn submit_phone(
        &mut self,
        raw: &str,
        params: &SessionParams,
        seq: &mut RequestSeq,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.step != IdentityStep::PhoneEntry || self.pending.is_some() {
            return Ok(Vec::new());
        }
        let phone = PhoneNumber::parse(raw, &params.country_prefix)
            .map_err(|_| SessionError::InvalidPhone)?;
        let request = seq.next();
        self.pending = Some(Pending::Dispatch(request));
        self.phone = Some(phone.clone());
        Ok(vec![Effect::RequestCode { request, phone }])
    }

    pub fn code_dispatched(
        &mut self,
        request: RequestId,
        result: Result<(), GatewayError>,
        params: &SessionParams,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.pending != Some(Pending::Dispatch(request)) {
            return Ok(Vec::new());
        }
        self.pending = None;

        match (self.step, result) {
            (IdentityStep::PhoneEntry, Ok(())) => {
                self.step = IdentityStep::CodeEntry;
                self.code.clear();
                self.timer.start(params.otp_resend_secs);
                Ok(vec![Effect::StartTicking])
            }
            (IdentityStep::CodeEntry, Ok(())) => Ok(Vec::new()),
            (IdentityStep::CodeEntry, Err(e)) => {
                // Resend failed: allow another attempt right away.
                self.timer.cancel();
                Err(SessionError::Service(e))
            }
            (_, Err(e)) => Err(SessionError::Service(e)),
            (_, Ok(())) => Ok(Vec::new()),
        }
    }

    /// Back from phone entry to ID entry. Ignored elsewhere.
    pub fn back(&mut self) -> Vec<Effect> {
        if self.step == IdentityStep::PhoneEntry {
            self.step = IdentityStep::IdEntry;
            self.phone = None;
            self.pending = None;
        }
        Vec::new()
    }

    pub fn enter_digits(
        &mut self,
        digits: &str,
        seq: &mut RequestSeq,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.step != IdentityStep::CodeEntry || self.pending.is_some() {
            return Ok(Vec::new());
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(SessionError::InvalidCode);
        }
        for c in digits.chars() {
            if self.code.len() == OneTimeCode::LEN {
                break;
            }
            self.code.push(c);
        }
        if self.code.len() < OneTimeCode::LEN {
            return Ok(Vec::new());
        }

        let code = OneTimeCode::parse(&self.code).map_err(|_| SessionError::InvalidCode)?;
        let Some(phone) = self.phone.clone() else {
            return Ok(Vec::new());
        };
        let request = seq.next();
        self.pending = Some(Pending::Verify(request));
        Ok(vec![Effect::VerifyCode {
            request,
            phone,
            code,
        }])
    }

    pub fn erase_digit(&mut self) {
        if self.step == IdentityStep::CodeEntry && self.pending.is_none() {
            self.code.pop();
        }
    }

    pub fn code_verified(
        &mut self,
        request: RequestId,
        result: Result<SessionToken, GatewayError>,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.pending != Some(Pending::Verify(request)) {
            return Ok(Vec::new());
        }
        self.pending = None;
        self.code.clear();

        let token = match result {
            Ok(token) => token,
            Err(GatewayError::Rejected(_)) => return Err(SessionError::CodeRejected),
            Err(e) => return Err(SessionError::Service(e)),
        };
        let (Some(national_id), Some(phone)) = (self.national_id.clone(), self.phone.clone())
        else {
            return Ok(Vec::new());
        };

        self.step = IdentityStep::Verified;
        self.verified = Some(VerifiedIdentity {
            national_id,
            phone,
            token,
        });
        let mut effects = Vec::new();
        if self.timer.is_running() {
            self.timer.cancel();
            effects.push(Effect::StopTicking);
        }
        Ok(effects)
    }

    pub fn resend_code(
        &mut self,
        params: &SessionParams,
        seq: &mut RequestSeq,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.step != IdentityStep::CodeEntry || self.pending.is_some() {
            return Ok(Vec::new());
        }
        if self.timer.is_running() {
            return Err(SessionError::ResendNotReady(self.timer.remaining()));
        }
        let Some(phone) = self.phone.clone() else {
            return Ok(Vec::new());
        };
        let request = seq.next();
        self.pending = Some(Pending::Dispatch(request));
        self.code.clear();
        self.timer.reset(params.otp_resend_secs);
        Ok(vec![Effect::RequestCode { request, phone }, Effect::StartTicking])
    }

    pub fn tick(&mut self) -> Vec<Effect> {
        match self.timer.tick() {
            Tick::Running(_) => Vec::new(),
            Tick::Elapsed | Tick::Idle => vec![Effect::StopTicking],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ID: &str = "52998224725";

    fn params() -> SessionParams {
        SessionParams::circuit_defaults()
    }

    fn request_of(effects: &[Effect]) -> RequestId {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::RegisterChallenge { request, .. }
                | Effect::RequestCode { request, .. }
                | Effect::VerifyCode { request, .. } => Some(*request),
                _ => None,
            })
            .expect("effect with a request id")
    }

    /// Drive the flow to code entry.
    fn at_code_entry(seq: &mut RequestSeq) -> IdentityFlow {
        let mut flow = IdentityFlow::new();
        let fx = flow.submit_national_id(VALID_ID, seq).unwrap();
        flow.challenge_registered(request_of(&fx), Ok(())).unwrap();
        let fx = flow.submit_phone("11999998888", &params(), seq).unwrap();
        let fx2 = flow.code_dispatched(request_of(&fx), Ok(()), &params()).unwrap();
        assert_eq!(fx2, vec![Effect::StartTicking]);
        assert_eq!(flow.step(), IdentityStep::CodeEntry);
        flow
    }

    #[test]
    fn invalid_id_stays_in_id_entry() {
        let mut seq = RequestSeq::default();
        let mut flow = IdentityFlow::new();
        assert_eq!(
            flow.submit_national_id("12345678900", &mut seq),
            Err(SessionError::InvalidNationalId)
        );
        assert_eq!(flow.step(), IdentityStep::IdEntry);
        assert!(!flow.is_busy());
    }

    #[test]
    fn challenge_failure_does_not_advance() {
        let mut seq = RequestSeq::default();
        let mut flow = IdentityFlow::new();
        let fx = flow.submit_national_id(VALID_ID, &mut seq).unwrap();
        let err = flow
            .challenge_registered(request_of(&fx), Err(GatewayError::Unavailable("down".into())))
            .unwrap_err();
        assert!(matches!(err, SessionError::Service(_)));
        assert_eq!(flow.step(), IdentityStep::IdEntry);
    }

    #[test]
    fn back_from_phone_entry() {
        let mut seq = RequestSeq::default();
        let mut flow = IdentityFlow::new();
        let fx = flow.submit_national_id(VALID_ID, &mut seq).unwrap();
        flow.challenge_registered(request_of(&fx), Ok(())).unwrap();
        assert_eq!(flow.step(), IdentityStep::PhoneEntry);
        assert_eq!(
            flow.submit_phone("123", &params(), &mut seq),
            Err(SessionError::InvalidPhone)
        );
        flow.back();
        assert_eq!(flow.step(), IdentityStep::IdEntry);
        assert!(flow.phone().is_none());
    }

    #[test]
    fn no_back_out_of_code_entry() {
        let mut seq = RequestSeq::default();
        let mut flow = at_code_entry(&mut seq);
        flow.back();
        assert_eq!(flow.step(), IdentityStep::CodeEntry);
    }

    #[test]
    fn sixth_digit_auto_submits() {
        let mut seq = RequestSeq::default();
        let mut flow = at_code_entry(&mut seq);
        assert!(flow.enter_digits("123", &mut seq).unwrap().is_empty());
        assert!(flow.enter_digits("45", &mut seq).unwrap().is_empty());
        let fx = flow.enter_digits("6", &mut seq).unwrap();
        match &fx[..] {
            [Effect::VerifyCode { code, phone, .. }] => {
                assert_eq!(code.as_str(), "123456");
                assert_eq!(phone.e164(), "+5511999998888");
            }
            other => panic!("unexpected effects {other:?}"),
        }
        // Input is frozen while verifying.
        assert!(flow.enter_digits("7", &mut seq).unwrap().is_empty());
        assert_eq!(flow.code_buffer(), "123456");
    }

    #[test]
    fn non_digit_input_is_rejected() {
        let mut seq = RequestSeq::default();
        let mut flow = at_code_entry(&mut seq);
        flow.enter_digits("12", &mut seq).unwrap();
        assert_eq!(flow.enter_digits("a", &mut seq), Err(SessionError::InvalidCode));
        assert_eq!(flow.code_buffer(), "12");
        flow.erase_digit();
        assert_eq!(flow.code_buffer(), "1");
    }

    #[test]
    fn wrong_code_clears_buffer_and_allows_retyping() {
        let mut seq = RequestSeq::default();
        let mut flow = at_code_entry(&mut seq);
        let fx = flow.enter_digits("000000", &mut seq).unwrap();
        let err = flow
            .code_verified(request_of(&fx), Err(GatewayError::Rejected("bad".into())))
            .unwrap_err();
        assert_eq!(err, SessionError::CodeRejected);
        assert_eq!(flow.code_buffer(), "");
        assert_eq!(flow.step(), IdentityStep::CodeEntry);
        assert_eq!(flow.enter_digits("1", &mut seq), Ok(Vec::new()));
    }

    #[test]
    fn correct_code_verifies_and_stops_timer() {
        let mut seq = RequestSeq::default();
        let mut flow = at_code_entry(&mut seq);
        let fx = flow.enter_digits("123456", &mut seq).unwrap();
        let fx = flow
            .code_verified(request_of(&fx), Ok(SessionToken::new("tok")))
            .unwrap();
        assert_eq!(fx, vec![Effect::StopTicking]);
        assert_eq!(flow.step(), IdentityStep::Verified);
        let verified = flow.take_verified().unwrap();
        assert_eq!(verified.token.expose(), "tok");
        assert_eq!(verified.phone.national_digits(), "11999998888");
        assert!(flow.take_verified().is_none());
    }

    #[test]
    fn resend_waits_for_countdown() {
        let mut seq = RequestSeq::default();
        let mut flow = at_code_entry(&mut seq);
        assert_eq!(flow.resend_remaining(), 60);
        assert_eq!(
            flow.resend_code(&params(), &mut seq),
            Err(SessionError::ResendNotReady(60))
        );
        for _ in 0..59 {
            assert!(flow.tick().is_empty());
            assert!(!flow.can_resend());
        }
        assert_eq!(flow.tick(), vec![Effect::StopTicking]);
        assert!(flow.can_resend());

        flow.enter_digits("12", &mut seq).unwrap();
        let fx = flow.resend_code(&params(), &mut seq).unwrap();
        assert!(matches!(fx[..], [Effect::RequestCode { .. }, Effect::StartTicking]));
        assert_eq!(flow.code_buffer(), "");
        assert_eq!(flow.resend_remaining(), 60);
    }

    #[test]
    fn failed_resend_reenables_resend() {
        let mut seq = RequestSeq::default();
        let mut flow = at_code_entry(&mut seq);
        for _ in 0..60 {
            flow.tick();
        }
        let fx = flow.resend_code(&params(), &mut seq).unwrap();
        let err = flow
            .code_dispatched(request_of(&fx), Err(GatewayError::Status(503)), &params())
            .unwrap_err();
        assert!(matches!(err, SessionError::Service(_)));
        assert!(flow.can_resend());
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut seq = RequestSeq::default();
        let mut flow = IdentityFlow::new();
        let fx = flow.submit_national_id(VALID_ID, &mut seq).unwrap();
        let stale = seq.next();
        assert_eq!(flow.challenge_registered(stale, Ok(())), Ok(Vec::new()));
        assert_eq!(flow.step(), IdentityStep::IdEntry);
        flow.challenge_registered(request_of(&fx), Ok(())).unwrap();
        assert_eq!(flow.step(), IdentityStep::PhoneEntry);
    }

    #[test]
    fn cancel_stops_running_timer() {
        let mut seq = RequestSeq::default();
        let mut flow = at_code_entry(&mut seq);
        assert_eq!(flow.cancel(), vec![Effect::StopTicking]);
        assert_eq!(flow.resend_remaining(), 0);
        assert!(flow.cancel().is_empty());
    }
}
