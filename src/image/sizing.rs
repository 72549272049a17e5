//! Resize and center-crop images to exact target dimensions.
//!
//! The dimension math is kept in pure functions over `(width, height)`
//! tuples so it can be tested without pixels; [`resize`] and [`center_crop`]
//! apply it to decoded images.

use crate::models::TargetDimensions;
use crate::{Error, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

/// Which side of the image is pinned to its target during resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeStrategy {
    /// Width becomes exactly the target width, height floats.
    ByWidth,
    /// Height becomes exactly the target height, width floats.
    ByHeight,
}

/// Pick the resize strategy that covers the target in both dimensions.
///
/// The height the image would have at exactly `target.width` is
/// `height * target.width / width`. When that falls short of
/// `target.height`, pinning the width would leave too little material to
/// crop, so the height is pinned instead. The comparison is done on exact
/// integer cross products.
///
/// # Examples
/// ```
/// # use s3_image_sizer::image::sizing::{choose_strategy, ResizeStrategy};
/// # use s3_image_sizer::models::TargetDimensions;
/// let target = TargetDimensions::new(1100, 250).unwrap();
/// assert_eq!(choose_strategy((1500, 280), target).unwrap(), ResizeStrategy::ByHeight);
/// assert_eq!(choose_strategy((1115, 280), target).unwrap(), ResizeStrategy::ByWidth);
/// ```
pub fn choose_strategy(source: (u32, u32), target: TargetDimensions) -> Result<ResizeStrategy> {
    let (width, height) = source;
    if width == 0 || height == 0 {
        return Err(Error::InvalidImage(format!(
            "image has zero-sized dimensions {}x{}",
            width, height
        )));
    }

    let height_at_target_width = u64::from(height) * u64::from(target.width);
    let required_height = u64::from(target.height) * u64::from(width);

    if height_at_target_width < required_height {
        Ok(ResizeStrategy::ByHeight)
    } else {
        Ok(ResizeStrategy::ByWidth)
    }
}

/// Dimensions after a ratio-preserving resize.
///
/// One side equals its target exactly and the other is at least its target.
pub fn resized_dimensions(source: (u32, u32), target: TargetDimensions) -> Result<(u32, u32)> {
    let (width, height) = source;

    Ok(match choose_strategy(source, target)? {
        ResizeStrategy::ByWidth => (target.width, scale(height, target.width, width)?),
        ResizeStrategy::ByHeight => (scale(width, target.height, height)?, target.height),
    })
}

/// `value * numerator / denominator` rounded half-up, never below 1.
fn scale(value: u32, numerator: u32, denominator: u32) -> Result<u32> {
    let denominator = u128::from(denominator);
    let scaled = (u128::from(value) * u128::from(numerator) * 2 + denominator) / (2 * denominator);
    u32::try_from(scaled).map(|scaled| scaled.max(1)).map_err(|_| {
        Error::InvalidImage(format!(
            "scaling {} by {}/{} overflows the image dimension range",
            value, numerator, denominator
        ))
    })
}

/// Top-left corner of the centered crop window.
///
/// For an overshoot `d` on an axis, `floor(d / 2)` pixels are removed from
/// the left/top and `ceil(d / 2)` from the right/bottom.
pub fn crop_offsets(source: (u32, u32), target: TargetDimensions) -> Result<(u32, u32)> {
    let (width, height) = source;
    if width < target.width || height < target.height {
        return Err(Error::InsufficientDimensions {
            width,
            height,
            target_width: target.width,
            target_height: target.height,
        });
    }

    Ok(((width - target.width) / 2, (height - target.height) / 2))
}

/// Region `(x, y, width, height)` of the source that scales onto the target
/// without distortion, centered with the same floor/ceil split as
/// [`crop_offsets`].
pub fn crop_window(source: (u32, u32), target: TargetDimensions) -> Result<(u32, u32, u32, u32)> {
    let (width, height) = source;

    let (window_width, window_height) = match choose_strategy(source, target)? {
        ResizeStrategy::ByWidth => (
            width,
            scale(width, target.height, target.width)?.min(height),
        ),
        ResizeStrategy::ByHeight => (
            scale(height, target.width, target.height)?.min(width),
            height,
        ),
    };

    Ok((
        (width - window_width) / 2,
        (height - window_height) / 2,
        window_width,
        window_height,
    ))
}

/// Fails with `InvalidImage` when a `dimensions` buffer would exceed the
/// decoder's default allocation limit.
fn check_allocation(dimensions: (u32, u32), bytes_per_pixel: u8) -> Result<()> {
    let limit = image::Limits::default().max_alloc.unwrap_or(u64::MAX);
    let required = u64::from(dimensions.0)
        .saturating_mul(u64::from(dimensions.1))
        .saturating_mul(u64::from(bytes_per_pixel));

    if required > limit {
        return Err(Error::InvalidImage(format!(
            "a {}x{} image needs {} bytes, over the {} byte limit",
            dimensions.0, dimensions.1, required, limit
        )));
    }
    Ok(())
}

/// Scale `image` uniformly so it covers `target`, one side matching exactly.
///
/// Returns the input unchanged when it already has the resized dimensions.
/// Fails with `InvalidImage` for a zero-sized source or when the resized
/// image would exceed the allocation limit.
pub fn resize(
    image: DynamicImage,
    target: TargetDimensions,
    filter: FilterType,
) -> Result<DynamicImage> {
    let source = image.dimensions();
    let strategy = choose_strategy(source, target)?;
    let (width, height) = resized_dimensions(source, target)?;

    if (width, height) == source {
        debug!("Image already fits {} without resizing", target);
        return Ok(image);
    }

    check_allocation((width, height), image.color().bytes_per_pixel())?;

    match strategy {
        ResizeStrategy::ByWidth => debug!("Resizing image by width to {}x{}", width, height),
        ResizeStrategy::ByHeight => debug!("Resizing image by height to {}x{}", width, height),
    }

    Ok(image.resize_exact(width, height, filter))
}

/// Trim `image` around its center to exactly `target`.
///
/// Returns the input unchanged when it is already the target size. Fails
/// with `InsufficientDimensions` if it is smaller on either axis; it never
/// pads or upscales.
pub fn center_crop(image: DynamicImage, target: TargetDimensions) -> Result<DynamicImage> {
    let source = image.dimensions();
    if source == (target.width, target.height) {
        debug!("Image is in the correct dimension, no need to crop");
        return Ok(image);
    }

    let (x, y) = crop_offsets(source, target)?;
    debug!(
        "Cropping {}x{} image to {} at offset ({}, {})",
        source.0, source.1, target, x, y
    );

    Ok(image.crop_imm(x, y, target.width, target.height))
}

/// Same result as [`resize`] followed by [`center_crop`], but the crop
/// window is taken from the source first so the only buffer allocated is
/// the target-sized output.
pub fn resize_and_crop(
    image: DynamicImage,
    target: TargetDimensions,
    filter: FilterType,
) -> Result<DynamicImage> {
    let source = image.dimensions();
    if source == (target.width, target.height) {
        debug!("Image is in the correct dimension, no need to resize or crop");
        return Ok(image);
    }

    check_allocation((target.width, target.height), image.color().bytes_per_pixel())?;

    let (x, y, width, height) = crop_window(source, target)?;
    debug!(
        "Cropping {}x{} source to {}x{} at offset ({}, {}) before scaling to {}",
        source.0, source.1, width, height, x, y, target
    );

    let window = image.crop_imm(x, y, width, height);
    if (width, height) == (target.width, target.height) {
        return Ok(window);
    }

    Ok(window.resize_exact(target.width, target.height, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};
    use pretty_assertions::assert_eq;

    fn target(width: u32, height: u32) -> TargetDimensions {
        TargetDimensions::new(width, height).unwrap()
    }

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([40, 90, 200])))
    }

    /// Grayscale image whose pixel value encodes its column (row when `by_row`).
    fn gradient(width: u32, height: u32, by_row: bool) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
            Luma([if by_row { y as u8 } else { x as u8 }])
        }))
    }

    #[test]
    fn test_wide_short_image_resizes_by_height() {
        // Floor division would give 280 / 1500 = 0 here and pick the wrong side.
        let dims = resized_dimensions((1500, 280), target(1100, 250)).unwrap();
        assert_eq!(dims, (1339, 250));
    }

    #[test]
    fn test_slightly_wider_image_resizes_by_width() {
        let dims = resized_dimensions((1115, 280), target(1100, 250)).unwrap();
        assert_eq!(dims, (1100, 276));
        assert_eq!(crop_offsets(dims, target(1100, 250)).unwrap(), (0, 13));
    }

    #[test]
    fn test_tall_narrow_image_resizes_by_width() {
        let strategy = choose_strategy((300, 2000), target(1100, 250)).unwrap();
        assert_eq!(strategy, ResizeStrategy::ByWidth);
        assert_eq!(
            resized_dimensions((300, 2000), target(1100, 250)).unwrap(),
            (1100, 7333)
        );
    }

    #[test]
    fn test_exact_aspect_ratio_hits_both_targets() {
        assert_eq!(
            resized_dimensions((2200, 500), target(1100, 250)).unwrap(),
            (1100, 250)
        );
        assert_eq!(
            resized_dimensions((550, 125), target(1100, 250)).unwrap(),
            (1100, 250)
        );
    }

    #[test]
    fn test_resize_postcondition_holds_across_shapes() {
        let targets = [target(1100, 250), target(250, 1100), target(64, 64), target(3, 7)];
        let sources = [
            (1, 1),
            (1, 5000),
            (5000, 1),
            (1500, 280),
            (1115, 280),
            (1099, 249),
            (4032, 3024),
            (333, 777),
        ];

        for t in targets {
            for source in sources {
                let (w, h) = resized_dimensions(source, t).unwrap();
                let exact_width = w == t.width && h >= t.height;
                let exact_height = h == t.height && w >= t.width;
                assert!(
                    exact_width || exact_height,
                    "{:?} -> {}x{} does not cover {}",
                    source,
                    w,
                    h,
                    t
                );
            }
        }
    }

    #[test]
    fn test_zero_sized_image_is_invalid() {
        let err = choose_strategy((0, 280), target(1100, 250)).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));

        let err = resized_dimensions((1500, 0), target(1100, 250)).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_crop_offsets_split_odd_overshoot() {
        assert_eq!(crop_offsets((15, 10), target(10, 10)).unwrap(), (2, 0));
        assert_eq!(crop_offsets((10, 17), target(10, 10)).unwrap(), (0, 3));
    }

    #[test]
    fn test_crop_offsets_reject_small_input() {
        let err = crop_offsets((1100, 205), target(1100, 250)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientDimensions {
                width: 1100,
                height: 205,
                target_width: 1100,
                target_height: 250,
            }
        ));
    }

    #[test]
    fn test_center_crop_identity_when_already_sized() {
        let image = gradient(40, 20, false);
        let original = image.as_bytes().to_vec();

        let cropped = center_crop(image, target(40, 20)).unwrap();
        assert_eq!(cropped.as_bytes(), original.as_slice());
    }

    #[test]
    fn test_center_crop_removes_floor_half_from_left() {
        let cropped = center_crop(gradient(15, 4, false), target(10, 4)).unwrap();

        assert_eq!(cropped.dimensions(), (10, 4));
        // Columns 2..12 survive: 2 removed on the left, 3 on the right.
        assert_eq!(cropped.get_pixel(0, 0).0[0], 2);
        assert_eq!(cropped.get_pixel(9, 0).0[0], 11);
    }

    #[test]
    fn test_center_crop_removes_floor_half_from_top() {
        let cropped = center_crop(gradient(6, 26, true), target(6, 13)).unwrap();

        assert_eq!(cropped.dimensions(), (6, 13));
        assert_eq!(cropped.get_pixel(0, 0).0[0], 6);
        assert_eq!(cropped.get_pixel(0, 12).0[0], 18);
    }

    #[test]
    fn test_center_crop_never_pads() {
        let err = center_crop(solid(1100, 205), target(1100, 250)).unwrap_err();
        assert!(matches!(err, Error::InsufficientDimensions { .. }));
    }

    #[test]
    fn test_resize_is_noop_at_target_size() {
        let image = gradient(30, 12, false);
        let original = image.as_bytes().to_vec();

        let resized = resize(image, target(30, 12), FilterType::Lanczos3).unwrap();
        assert_eq!(resized.as_bytes(), original.as_slice());
    }

    #[test]
    fn test_resize_and_crop_is_idempotent() {
        let image = gradient(50, 20, false);
        let original = image.as_bytes().to_vec();

        let result = resize_and_crop(image, target(50, 20), FilterType::Lanczos3).unwrap();
        assert_eq!(result.as_bytes(), original.as_slice());
    }

    #[test]
    fn test_resize_and_crop_wide_banner() {
        let result = resize_and_crop(solid(1500, 280), target(1100, 250), FilterType::Triangle)
            .unwrap();
        assert_eq!(result.dimensions(), (1100, 250));
    }

    #[test]
    fn test_resize_and_crop_upscales_small_sources() {
        let result =
            resize_and_crop(solid(110, 28), target(1100, 250), FilterType::Nearest).unwrap();
        assert_eq!(result.dimensions(), (1100, 250));
    }

    #[test]
    fn test_resize_and_crop_portrait_target() {
        let result =
            resize_and_crop(solid(640, 480), target(120, 200), FilterType::Triangle).unwrap();
        assert_eq!(result.dimensions(), (120, 200));
    }

    #[test]
    fn test_crop_window_matches_crop_offsets_convention() {
        assert_eq!(
            crop_window((1115, 280), target(1100, 250)).unwrap(),
            (0, 13, 1115, 253)
        );
        assert_eq!(
            crop_window((1500, 280), target(1100, 250)).unwrap(),
            (134, 0, 1232, 280)
        );
        assert_eq!(crop_window((15, 4), target(10, 4)).unwrap(), (2, 0, 10, 4));
    }

    #[test]
    fn test_resize_and_crop_keeps_center_columns() {
        let result =
            resize_and_crop(gradient(15, 4, false), target(10, 4), FilterType::Nearest).unwrap();

        assert_eq!(result.dimensions(), (10, 4));
        assert_eq!(result.get_pixel(0, 0).0[0], 2);
        assert_eq!(result.get_pixel(9, 0).0[0], 11);
    }

    #[test]
    fn test_extreme_aspect_ratio_is_sized_without_huge_intermediate() {
        let sliver = DynamicImage::ImageRgb8(RgbImage::new(2, 20000));

        let result = resize_and_crop(sliver, target(1100, 250), FilterType::Nearest).unwrap();
        assert_eq!(result.dimensions(), (1100, 250));
    }

    #[test]
    fn test_resize_rejects_oversized_intermediate() {
        assert_eq!(
            resized_dimensions((2, 20000), target(1100, 250)).unwrap(),
            (1100, 11_000_000)
        );

        let sliver = DynamicImage::ImageRgb8(RgbImage::new(2, 20000));
        let err = resize(sliver, target(1100, 250), FilterType::Nearest).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_oversized_target_is_rejected() {
        let err = resize_and_crop(solid(4, 4), target(100_000, 100_000), FilterType::Nearest)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_scaled_dimension_overflow_is_an_error() {
        let err = resized_dimensions((1, u32::MAX), target(1100, 250)).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }
}
