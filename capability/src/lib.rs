//! Capability adapters.
//!
//! Thin wrappers around host-platform primitives that the voting session
//! needs but does not own:
//! - [`CameraAdapter`]: one video stream at a time, facing-mode switch, fallback constraints.
//! - [`GeolocationAdapter`]: one-shot position fetch checked against a geofence.
//! - [`CountdownTimer`]: restartable second counter gating the code resend.
//!
//! The host side is abstracted by the traits in [`host`] so the adapters can
//! run against a browser bridge, a native camera, or a test double.

pub mod camera;
pub mod countdown;
pub mod error;
pub mod geolocation;
pub mod host;

pub use camera::CameraAdapter;
pub use countdown::{CountdownTimer, Tick};
pub use error::{CameraError, GeoError, MediaError};
pub use geolocation::GeolocationAdapter;
pub use host::{MediaDevices, MediaStream, PositionSource, VideoConstraints};
