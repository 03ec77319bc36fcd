//! Errors raised while constructing validated types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypesError {
    #[error("invalid national ID")]
    InvalidNationalId,

    #[error("invalid phone number")]
    InvalidPhone,

    #[error("invalid one-time code")]
    InvalidCode,

    #[error("score {0} is outside [1.0, 5.0]")]
    ScoreOutOfRange(f64),

    #[error("comment has {len} characters, limit is {max}")]
    CommentTooLong { len: usize, max: usize },

    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },

    #[error("a {width}x{height} frame does not fit in memory")]
    FrameTooLarge { width: u32, height: u32 },

    #[error("a {width}x{height} photo is not 3:4 portrait")]
    AspectRatio { width: u32, height: u32 },

    #[error("crop {rect} does not fit a {width}x{height} frame")]
    CropOutOfBounds {
        rect: String,
        width: u32,
        height: u32,
    },
}
