//! Existing-vote query and vote submission.

use std::future::Future;

use juror_types::{EditionId, PlateId, SessionToken, SubmissionReceipt, VoteDraft};

use crate::GatewayError;

pub trait VoteRegistry: Send + Sync {
    /// Whether the juror behind `token` already has an accepted vote for
    /// `plate` in `edition`.
    fn has_voted(
        &self,
        plate: PlateId,
        edition: EditionId,
        token: Option<&SessionToken>,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;
}

pub trait SubmissionGateway: Send + Sync {
    /// Record a finished vote. At most one vote per juror, plate and edition
    /// is accepted; a duplicate is [`GatewayError::Rejected`].
    fn submit(
        &self,
        draft: &VoteDraft,
    ) -> impl Future<Output = Result<SubmissionReceipt, GatewayError>> + Send;
}
