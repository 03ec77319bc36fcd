//! Aspect-ratio normalization of captured frames.

pub use juror_types::{ASPECT_H, ASPECT_W};
use juror_types::{CapturedPhoto, CropRect, Frame, TypesError};

/// Largest centered rectangle of exactly 3:4 inside a `width` x `height` frame.
///
/// A frame wider than 3:4 loses columns on both sides; a taller one loses
/// rows top and bottom. `None` if the frame is smaller than 3x4.
pub fn centered_crop(width: u32, height: u32) -> Option<CropRect> {
    if width < ASPECT_W || height < ASPECT_H {
        return None;
    }

    let wider =
        u64::from(width) * u64::from(ASPECT_H) > u64::from(height) * u64::from(ASPECT_W);
    let (crop_w, crop_h) = if wider {
        let h = height - height % ASPECT_H;
        (h / ASPECT_H * ASPECT_W, h)
    } else {
        let w = width - width % ASPECT_W;
        (w, w / ASPECT_W * ASPECT_H)
    };

    Some(CropRect {
        x: (width - crop_w) / 2,
        y: (height - crop_h) / 2,
        width: crop_w,
        height: crop_h,
    })
}

/// Crop `frame` to 3:4 and freeze it as a photo.
pub fn normalize(frame: Frame) -> Result<CapturedPhoto, TypesError> {
    let rect = centered_crop(frame.width(), frame.height()).ok_or_else(|| {
        TypesError::CropOutOfBounds {
            rect: format!("{ASPECT_W}x{ASPECT_H}+0+0"),
            width: frame.width(),
            height: frame.height(),
        }
    })?;
    let cropped = frame.crop(rect)?;
    CapturedPhoto::from_frame(cropped)
}
