//! Voting session state machine.
//!
//! Takes a visitor from "unknown person" to one recorded vote for one plate:
//! 1. **Identity**: national ID, phone, one-time code, session token.
//! 2. **Capture**: existing-vote check, camera, 3:4 still, content analysis,
//!    with geolocation running alongside.
//! 3. **Scoring**: three criteria, optional comment, review, single submission.
//!
//! Everything here is pure. [`VotingSession::handle`] consumes one [`Event`]
//! and returns the [`Effect`]s the caller must perform; results come back as
//! further events tagged with the [`RequestId`] that asked for them, so a
//! superseded request's late result is ignored.

pub mod capture;
pub mod crop;
pub mod effect;
pub mod error;
pub mod event;
pub mod identity;
pub mod machine;
pub mod request;
pub mod scoring;

pub use capture::{CaptureFlow, CaptureStep};
pub use crop::{centered_crop, normalize};
pub use effect::Effect;
pub use error::{ErrorKind, SessionError};
pub use event::Event;
pub use identity::{IdentityFlow, IdentityStep, VerifiedIdentity};
pub use machine::{GeoStatus, Phase, VotingSession};
pub use request::{RequestId, RequestSeq};
pub use scoring::{ScoringFlow, ScoringStep};
