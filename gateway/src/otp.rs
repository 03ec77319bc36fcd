//! One-time-code identity service.

use std::future::Future;

use juror_types::{NationalId, OneTimeCode, PhoneNumber, SessionToken};

use crate::GatewayError;

pub trait OtpService: Send + Sync {
    /// Register intent to verify `id`. No code is sent yet.
    fn register_challenge(
        &self,
        id: &NationalId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Send a fresh code to `phone`.
    fn request_code(
        &self,
        phone: &PhoneNumber,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Exchange a code for a session token. A wrong code is
    /// [`GatewayError::Rejected`].
    fn verify_code(
        &self,
        phone: &PhoneNumber,
        code: &OneTimeCode,
    ) -> impl Future<Output = Result<SessionToken, GatewayError>> + Send;
}
