//! Tunable values read by the session state machine.

use serde::{Deserialize, Serialize};

use crate::EditionId;

/// Parameters for one voting session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Edition the vote is cast in.
    pub edition_id: EditionId,

    /// Seconds before "resend code" is enabled again.
    pub otp_resend_secs: u32,

    /// Geofence radius around the restaurant, in meters.
    pub geofence_radius_m: f64,

    /// Country calling code prepended to validated phone numbers.
    pub country_prefix: String,

    /// Comment length limit, in characters.
    pub comment_max_chars: usize,

    /// Ceiling the analysis progress indicator approaches while waiting.
    pub analysis_progress_ceiling: u8,
}

impl SessionParams {
    pub fn circuit_defaults() -> Self {
        Self {
            edition_id: EditionId(2024),
            otp_resend_secs: 60,
            geofence_radius_m: 200.0,
            country_prefix: "55".to_string(),
            comment_max_chars: 280,
            analysis_progress_ceiling: 95,
        }
    }
}

impl Default for SessionParams {
    fn default() -> Self {
        Self::circuit_defaults()
    }
}
