use std::future::Future;

use juror_types::CapturedPhoto;

use crate::GatewayError;

/// Opaque fraud/quality check on a captured photo.
pub trait ContentAnalyzer: Send + Sync {
    fn analyze(
        &self,
        photo: &CapturedPhoto,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
