//! Runtime configuration with TOML file support.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use juror_types::{EditionId, SessionParams};

use crate::{LogFormat, RuntimeError};

/// Configuration for a kiosk running voting sessions.
///
/// Can be loaded from a TOML file via [`RuntimeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default, so an
/// empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Base URL of the circuit backend.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Edition votes are cast in.
    #[serde(default = "default_edition_id")]
    pub edition_id: u32,

    /// Seconds before "resend code" is enabled.
    #[serde(default = "default_otp_resend_secs")]
    pub otp_resend_secs: u32,

    /// Geofence radius around the restaurant, in meters.
    #[serde(default = "default_geofence_radius_m")]
    pub geofence_radius_m: f64,

    /// How long a single position request may take.
    #[serde(default = "default_geolocation_timeout_secs")]
    pub geolocation_timeout_secs: u64,

    /// Country calling code prepended to phone numbers.
    #[serde(default = "default_country_prefix")]
    pub country_prefix: String,

    /// Comment length limit, in characters.
    #[serde(default = "default_comment_max_chars")]
    pub comment_max_chars: usize,

    /// Period of the analysis progress ticker.
    #[serde(default = "default_analysis_progress_interval_ms")]
    pub analysis_progress_interval_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_gateway_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_edition_id() -> u32 {
    SessionParams::circuit_defaults().edition_id.0
}

fn default_otp_resend_secs() -> u32 {
    SessionParams::circuit_defaults().otp_resend_secs
}

fn default_geofence_radius_m() -> f64 {
    SessionParams::circuit_defaults().geofence_radius_m
}

fn default_geolocation_timeout_secs() -> u64 {
    10
}

fn default_country_prefix() -> String {
    SessionParams::circuit_defaults().country_prefix
}

fn default_comment_max_chars() -> usize {
    SessionParams::circuit_defaults().comment_max_chars
}

fn default_analysis_progress_interval_ms() -> u64 {
    250
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RuntimeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, RuntimeError> {
        let config: Self = toml::from_str(s).map_err(|e| RuntimeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    /// Reject values no session could work with.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if !(self.geofence_radius_m.is_finite() && self.geofence_radius_m > 0.0) {
            return Err(RuntimeError::Config(format!(
                "geofence_radius_m must be positive, got {}",
                self.geofence_radius_m
            )));
        }
        if self.analysis_progress_interval_ms == 0 {
            return Err(RuntimeError::Config(
                "analysis_progress_interval_ms must be non-zero".into(),
            ));
        }
        self.log_format()?;
        Ok(())
    }

    /// The values the session state machine reads.
    pub fn session_params(&self) -> SessionParams {
        SessionParams {
            edition_id: EditionId(self.edition_id),
            otp_resend_secs: self.otp_resend_secs,
            geofence_radius_m: self.geofence_radius_m,
            country_prefix: self.country_prefix.clone(),
            comment_max_chars: self.comment_max_chars,
            ..SessionParams::circuit_defaults()
        }
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.analysis_progress_interval_ms)
    }

    pub fn log_format(&self) -> Result<LogFormat, RuntimeError> {
        self.log_format.parse()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            edition_id: default_edition_id(),
            otp_resend_secs: default_otp_resend_secs(),
            geofence_radius_m: default_geofence_radius_m(),
            geolocation_timeout_secs: default_geolocation_timeout_secs(),
            country_prefix: default_country_prefix(),
            comment_max_chars: default_comment_max_chars(),
            analysis_progress_interval_ms: default_analysis_progress_interval_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = RuntimeConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = RuntimeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = RuntimeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.gateway_url, "http://127.0.0.1:8080");
        assert_eq!(config.edition_id, 2024);
        assert_eq!(config.otp_resend_secs, 60);
        assert_eq!(config.geofence_radius_m, 200.0);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.session_params(), SessionParams::circuit_defaults());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            edition_id = 2025
            geofence_radius_m = 350.5
            log_format = "json"
        "#;
        let config = RuntimeConfig::from_toml_str(toml).expect("should parse");
        let params = config.session_params();
        assert_eq!(params.edition_id, EditionId(2025));
        assert_eq!(params.geofence_radius_m, 350.5);
        assert_eq!(params.otp_resend_secs, 60);
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(RuntimeConfig::from_toml_str("geofence_radius_m = -1.0").is_err());
        assert!(RuntimeConfig::from_toml_str("analysis_progress_interval_ms = 0").is_err());
        assert!(RuntimeConfig::from_toml_str(r#"log_format = "xml""#).is_err());
        assert!(RuntimeConfig::from_toml_str("edition_id = \"x\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "otp_resend_secs = 30").unwrap();
        writeln!(file, "country_prefix = \"351\"").unwrap();
        let config = RuntimeConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.otp_resend_secs, 30);
        assert_eq!(config.session_params().country_prefix, "351");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RuntimeConfig::from_toml_file(dir.path().join("kiosk.toml"));
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }
}
