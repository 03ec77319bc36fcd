//! Fundamental types for the juror voting flow.
//!
//! This crate defines the data model shared by every other crate in the workspace:
//! credentials, plates, geolocation fixes, camera frames and captured photos,
//! criterion scores, the vote draft, and the session parameters.

pub mod credentials;
pub mod error;
pub mod geo;
pub mod media;
pub mod params;
pub mod plate;
pub mod score;
pub mod vote;

pub use credentials::{NationalId, OneTimeCode, PhoneNumber, SessionToken};
pub use error::TypesError;
pub use geo::{GeoFix, GeoPoint};
pub use media::{CapturedPhoto, ASPECT_H, ASPECT_W, CropRect, Facing, Frame, PreviewRef};
pub use params::SessionParams;
pub use plate::{EditionId, Plate, PlateId};
pub use score::{Comment, Criterion, CriterionScore, ScoreSheet};
pub use vote::{SubmissionReceipt, VoteDraft};
