use std::future::Future;

use juror_types::{EditionId, Plate, PlateId};

use crate::GatewayError;

pub trait PlateLookup: Send + Sync {
    fn fetch_plate(
        &self,
        plate: PlateId,
        edition: EditionId,
    ) -> impl Future<Output = Result<Plate, GatewayError>> + Send;
}
