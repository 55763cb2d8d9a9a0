//! Aspect-preserving resize to the print width.

use image::{imageops, imageops::FilterType, RgbaImage};

/// Output height for a source of `width x height` scaled to `target_width`.
///
/// `round(height * target_width / width)`, never less than one row.
pub fn target_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (height as f64 * target_width as f64 / width as f64).round();
    (scaled as u32).max(1)
}

/// Scale `image` uniformly so its width becomes `target_width`.
///
/// Lanczos3 in both directions. An image already at the target size is
/// returned unchanged.
pub fn resize_to_width(image: &RgbaImage, target_width: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let new_height = target_height(width, height, target_width);

    if width == target_width && height == new_height {
        return image.clone();
    }

    imageops::resize(image, target_width, new_height, FilterType::Lanczos3)
}
