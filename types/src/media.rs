//! Camera frames and captured photos.

use std::fmt;
use std::sync::Arc;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

use crate::TypesError;

type Blake2b256 = Blake2b<U32>;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Photo aspect ratio as width : height.
pub const ASPECT_W: u32 = 3;
pub const ASPECT_H: u32 = 4;

/// Byte length of a `width` x `height` RGBA buffer, `None` on overflow.
fn buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

/// Which way the camera faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Front,
    Back,
}

impl Facing {
    pub fn opposite(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }

    /// The host platform's facing-mode constraint value.
    pub fn as_constraint(self) -> &'static str {
        match self {
            Facing::Front => "user",
            Facing::Back => "environment",
        }
    }
}

/// A raw RGBA video frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TypesError> {
        let expected =
            buffer_len(width, height).ok_or(TypesError::FrameTooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(TypesError::FrameSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame filled with one colour.
    ///
    /// # Panics
    ///
    /// If the buffer cannot be allocated. Use [`Frame::new`] for
    /// dimensions that come from outside.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            pixels: rgba.repeat(count),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy the pixels inside `rect` into a new frame.
    pub fn crop(&self, rect: CropRect) -> Result<Frame, TypesError> {
        let fits = rect.x.checked_add(rect.width).is_some_and(|r| r <= self.width)
            && rect.y.checked_add(rect.height).is_some_and(|b| b <= self.height);
        if !fits {
            return Err(TypesError::CropOutOfBounds {
                rect: rect.to_string(),
                width: self.width,
                height: self.height,
            });
        }

        let row_len = rect.width as usize * BYTES_PER_PIXEL;
        let stride = self.width as usize * BYTES_PER_PIXEL;
        let mut pixels = Vec::with_capacity(row_len * rect.height as usize);
        for row in rect.y..rect.y + rect.height {
            let start = row as usize * stride + rect.x as usize * BYTES_PER_PIXEL;
            pixels.extend_from_slice(&self.pixels[start..start + row_len]);
        }
        Ok(Frame {
            width: rect.width,
            height: rect.height,
            pixels,
        })
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// A rectangle inside a frame, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Local reference to a photo preview, derived from its content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewRef(String);

impl PreviewRef {
    fn of(width: u32, height: u32, pixels: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(width.to_le_bytes());
        hasher.update(height.to_le_bytes());
        hasher.update(pixels);
        let digest = hasher.finalize();
        Self(format!("preview-{}", hex::encode(&digest[..8])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized still photo. Immutable once produced; cloning shares the
/// pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
    preview: PreviewRef,
}

impl CapturedPhoto {
    /// Freeze an already-normalized frame into a photo. The frame must be
    /// non-empty and exactly 3:4.
    pub fn from_frame(frame: Frame) -> Result<Self, TypesError> {
        let (width, height) = (frame.width, frame.height);
        let portrait = u64::from(width) * u64::from(ASPECT_H)
            == u64::from(height) * u64::from(ASPECT_W);
        if width == 0 || !portrait {
            return Err(TypesError::AspectRatio { width, height });
        }
        let preview = PreviewRef::of(width, height, &frame.pixels);
        Ok(Self {
            width,
            height,
            pixels: frame.pixels.into(),
            preview,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn preview(&self) -> &PreviewRef {
        &self.preview
    }
}

impl fmt::Debug for CapturedPhoto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedPhoto")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("preview", &self.preview)
            .finish()
    }
}
