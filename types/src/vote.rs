//! The finished vote and the gateway's answer to it.

use serde::{Deserialize, Serialize};

use crate::{CapturedPhoto, EditionId, PlateId, ScoreSheet, SessionToken};

/// Everything the submission gateway needs to record one vote.
#[derive(Clone, Debug, PartialEq)]
pub struct VoteDraft {
    pub plate_id: PlateId,
    pub edition_id: EditionId,
    pub session_token: SessionToken,
    pub photo: CapturedPhoto,
    pub scores: ScoreSheet,
}

/// Result of an accepted vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub ranking_position: u32,
    #[serde(default)]
    pub badge_unlocked: Option<String>,
}
