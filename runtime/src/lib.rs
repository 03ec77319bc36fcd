//! Async runtime for a voting session.
//!
//! [`SessionDriver`] owns a [`VotingSession`](juror_session::VotingSession)
//! and performs the effects it asks for on tokio: backend calls and the
//! geolocation fetch run as spawned tasks, the camera lives in its own actor
//! task so exactly one stream exists, and interval tasks deliver the resend
//! countdown and analysis progress ticks. Every result is fed back to the
//! session as an event through a single channel, one at a time.

pub mod camera;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;

pub use camera::CameraHandle;
pub use config::RuntimeConfig;
pub use driver::SessionDriver;
pub use error::RuntimeError;
pub use logging::{init_logging, LogFormat};
