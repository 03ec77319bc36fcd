//! External collaborators of the voting session.
//!
//! Every collaborator is a trait; the session runtime depends only on the
//! traits. [`HttpGateway`] binds all of them to a JSON-over-HTTP backend and
//! the `juror-nullables` crate provides in-memory doubles for tests.

pub mod analysis;
pub mod error;
pub mod http;
pub mod otp;
pub mod plates;
pub mod votes;

pub use analysis::ContentAnalyzer;
pub use error::GatewayError;
pub use http::HttpGateway;
pub use otp::OtpService;
pub use plates::PlateLookup;
pub use votes::{SubmissionGateway, VoteRegistry};

/// Everything a voting session talks to, bundled so the runtime takes one
/// type parameter.
pub trait Backend:
    OtpService + VoteRegistry + ContentAnalyzer + SubmissionGateway + PlateLookup + 'static
{
}

impl<T> Backend for T where
    T: OtpService + VoteRegistry + ContentAnalyzer + SubmissionGateway + PlateLookup + 'static
{
}
