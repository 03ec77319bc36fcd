//! Juror credentials: national ID, phone number, one-time code, session token.

use std::fmt;

use juror_validation::{digits_only, validate_national_id, validate_otp, validate_phone, OTP_LEN};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::TypesError;

/// An 11-digit national ID that passed the mod-11 checksum.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NationalId(String);

impl NationalId {
    /// Validate `raw` (separators allowed) and keep its digits.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        if !validate_national_id(raw) {
            return Err(TypesError::InvalidNationalId);
        }
        Ok(Self(digits_only(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the last two digits are shown in logs.
        write!(f, "*********{}", &self.0[9..])
    }
}

/// A validated phone number (area code + number) with its country prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    country_prefix: String,
    digits: String,
}

impl PhoneNumber {
    /// Validate `raw` (10 or 11 digits once separators are stripped) and
    /// attach `country_prefix`.
    pub fn parse(raw: &str, country_prefix: &str) -> Result<Self, TypesError> {
        if !validate_phone(raw) {
            return Err(TypesError::InvalidPhone);
        }
        Ok(Self {
            country_prefix: digits_only(country_prefix),
            digits: digits_only(raw),
        })
    }

    /// National digits without the country prefix.
    pub fn national_digits(&self) -> &str {
        &self.digits
    }

    /// `+<country><area><number>`, used for dispatch and display.
    pub fn e164(&self) -> String {
        format!("+{}{}", self.country_prefix, self.digits)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.e164())
    }
}

/// Exactly six numeric digits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    pub const LEN: usize = OTP_LEN;

    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        if !validate_otp(raw) {
            return Err(TypesError::InvalidCode);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque credential issued after a successful code verification.
///
/// Redacted in `Debug` output and zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token, for attaching to privileged calls.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}
