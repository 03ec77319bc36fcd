//! Host capabilities for a terminal kiosk.
//!
//! A terminal has no live camera or GPS, so the kiosk serves a still image
//! from disk as its video stream and reports a fixed, configured position.

use std::io;
use std::path::PathBuf;

use juror_capability::{
    GeoError, MediaDevices, MediaError, MediaStream, PositionSource, VideoConstraints,
};
use juror_types::{Frame, GeoPoint, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PpmError {
    #[error("not a binary PPM (P6) image")]
    NotP6,

    #[error("malformed PPM header: missing {0}")]
    Header(&'static str),

    #[error("unsupported PPM maxval {0} (expected 1..=255)")]
    UnsupportedMaxval(u32),

    #[error("PPM dimensions {width}x{height} are too large")]
    TooLarge { width: u32, height: u32 },

    #[error("PPM pixel data truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error(transparent)]
    Frame(#[from] TypesError),
}

/// Decode a binary PPM (`P6`) image into an opaque RGBA frame.
pub fn decode_ppm(bytes: &[u8]) -> Result<Frame, PpmError> {
    let mut pos = 0;
    if header_field(bytes, &mut pos) != Some(b"P6".as_slice()) {
        return Err(PpmError::NotP6);
    }
    let width = header_number(bytes, &mut pos, "width")?;
    let height = header_number(bytes, &mut pos, "height")?;
    let maxval = header_number(bytes, &mut pos, "maxval")?;
    if maxval == 0 || maxval > 255 {
        return Err(PpmError::UnsupportedMaxval(maxval));
    }
    // Exactly one whitespace byte separates the header from the raster.
    let data = bytes.get(pos + 1..).unwrap_or_default();

    let too_large = || PpmError::TooLarge { width, height };
    let count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(too_large)?;
    let expected = count.checked_mul(3).ok_or_else(too_large)?;
    let rgba_len = count.checked_mul(4).ok_or_else(too_large)?;
    if data.len() < expected {
        return Err(PpmError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let mut pixels = Vec::with_capacity(rgba_len);
    for rgb in data[..expected].chunks_exact(3) {
        for &channel in rgb {
            pixels.push((u32::from(channel).min(maxval) * 255 / maxval) as u8);
        }
        pixels.push(u8::MAX);
    }
    Ok(Frame::new(width, height, pixels)?)
}

fn header_field<'a>(bytes: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    loop {
        while bytes.get(*pos).is_some_and(u8::is_ascii_whitespace) {
            *pos += 1;
        }
        if bytes.get(*pos) != Some(&b'#') {
            break;
        }
        while bytes.get(*pos).is_some_and(|&b| b != b'\n') {
            *pos += 1;
        }
    }
    let start = *pos;
    while bytes.get(*pos).is_some_and(|b| !b.is_ascii_whitespace()) {
        *pos += 1;
    }
    (start < *pos).then(|| &bytes[start..*pos])
}

fn header_number(
    bytes: &[u8],
    pos: &mut usize,
    name: &'static str,
) -> Result<u32, PpmError> {
    header_field(bytes, pos)
        .and_then(|field| std::str::from_utf8(field).ok())
        .and_then(|field| field.parse().ok())
        .ok_or(PpmError::Header(name))
}

/// Camera that streams a still image read from disk.
///
/// The file is read again on every start, so replacing it between takes
/// changes what the next capture sees. Both facings show the same image.
#[derive(Clone, Debug)]
pub struct StillCamera {
    path: PathBuf,
}

impl StillCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MediaDevices for StillCamera {
    type Stream = StillStream;

    async fn get_user_media(
        &self,
        constraints: VideoConstraints,
    ) -> Result<StillStream, MediaError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MediaError::NotFound,
            io::ErrorKind::PermissionDenied => MediaError::NotAllowed,
            _ => MediaError::NotReadable(e.to_string()),
        })?;
        let frame =
            decode_ppm(&bytes).map_err(|e| MediaError::NotReadable(e.to_string()))?;
        tracing::debug!(
            path = %self.path.display(),
            facing = ?constraints.facing,
            width = frame.width(),
            height = frame.height(),
            "still camera opened"
        );
        Ok(StillStream { frame: Some(frame) })
    }
}

#[derive(Debug)]
pub struct StillStream {
    frame: Option<Frame>,
}

impl MediaStream for StillStream {
    fn grab_frame(&mut self) -> Result<Frame, MediaError> {
        self.frame
            .clone()
            .ok_or_else(|| MediaError::NotReadable("stream stopped".into()))
    }

    fn stop(&mut self) {
        self.frame = None;
    }
}

/// Position source pinned to one point.
#[derive(Clone, Copy, Debug)]
pub struct FixedPosition {
    point: GeoPoint,
}

impl FixedPosition {
    pub fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<GeoPoint, GeoError> {
        Ok(self.point)
    }
}
