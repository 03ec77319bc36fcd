//! Nullable infrastructure for deterministic testing.
//!
//! Every host capability and backend collaborator of the voting session is a
//! trait. This crate provides test-friendly implementations that:
//! - Return scripted, deterministic results
//! - Can be controlled programmatically while a session runs
//! - Never touch real hardware or the network
//!
//! Each nullable is a cheap `Clone` handle over shared state, so a test keeps
//! one handle for assertions and hands another to the runtime.

pub mod backend;
pub mod camera;
pub mod position;

pub use backend::{BackendCall, NullBackend};
pub use camera::{NullCamera, NullStream};
pub use position::NullPosition;

use std::sync::{Mutex, MutexGuard};

/// Lock ignoring poisoning; a panicking test thread must not cascade.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
