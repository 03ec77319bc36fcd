//! Shared utilities for the juror voting flow.

pub mod time;

pub use time::{format_countdown, format_duration};
