use juror_session::{centered_crop, normalize};
use juror_types::Frame;
use proptest::prelude::*;

proptest! {
    #[test]
    fn crop_is_exactly_three_by_four(width in 3u32..4000, height in 4u32..4000) {
        let rect = centered_crop(width, height).unwrap();
        prop_assert_eq!(u64::from(rect.width) * 4, u64::from(rect.height) * 3);
        prop_assert!(rect.x + rect.width <= width);
        prop_assert!(rect.y + rect.height <= height);
    }

    #[test]
    fn crop_is_centered_and_maximal(width in 3u32..4000, height in 4u32..4000) {
        let rect = centered_crop(width, height).unwrap();
        // Centered to within one pixel on both axes.
        let left = rect.x;
        let right = width - rect.x - rect.width;
        prop_assert!(left.abs_diff(right) <= 1);
        let top = rect.y;
        let bottom = height - rect.y - rect.height;
        prop_assert!(top.abs_diff(bottom) <= 1);
        // One more 3:4 step would not fit.
        prop_assert!(rect.width + 3 > width || rect.height + 4 > height);
    }

    #[test]
    fn normalized_photo_keeps_ratio(width in 3u32..96, height in 4u32..96) {
        let photo = normalize(Frame::solid(width, height, [1, 2, 3, 255])).unwrap();
        prop_assert_eq!(photo.width() * 4, photo.height() * 3);
        prop_assert_eq!(photo.pixels().len(), (photo.width() * photo.height() * 4) as usize);
    }
}
