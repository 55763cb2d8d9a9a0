//! Image preprocessing for thermal printing.
//!
//! The pipeline runs in a fixed order:
//!
//! 1. **Resize** (Lanczos3) to the print width, height scaled to keep the
//!    aspect ratio
//! 2. **Luminance** (BT.601), transparent areas composited over white
//! 3. **Brightness** additive shift, clamped
//! 4. **Contrast** scaling around mid-grey, clamped
//!
//! Resize happens first so the filter sees the original colours, and the
//! tone adjustments then operate on exactly the grey levels the dither
//! engine will consume. Reordering these steps changes the printed output.

mod adjust;
mod resize;

pub use adjust::{apply_curve, luminance, tone_curve};
pub use resize::{resize_to_width, target_height};

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageReader};

use crate::config::{DitherConfig, MAX_OUTPUT_PIXELS};
use crate::error::{ConvertError, Result};

/// 8-bit greyscale image ready for dithering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleImage {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayscaleImage {
    /// Wrap an existing row-major grey buffer.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `pixels.len() == width * height`.
    pub fn from_luma(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Grey levels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * self.width + x) as usize]
    }
}

impl From<GrayImage> for GrayscaleImage {
    fn from(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_luma(width, height, image.into_raw())
    }
}

/// Decode an image file.
///
/// The format is sniffed from the file contents, so a misnamed extension
/// still decodes.
pub fn load_source(path: &Path) -> Result<DynamicImage> {
    let decode_err = |source| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?;

    reader.decode().map_err(decode_err)
}

/// Resize, flatten to grey and tone-adjust `source`.
///
/// Parameters are validated before any pixel work; out-of-range values fail
/// with [`ConvertError::InvalidParameter`].
pub fn preprocess(
    source: &DynamicImage,
    target_width: u32,
    brightness: i32,
    contrast: f32,
) -> Result<GrayscaleImage> {
    DitherConfig::new()
        .target_width(target_width)
        .brightness(brightness)
        .contrast(contrast)
        .validate()?;

    if source.width() == 0 || source.height() == 0 {
        return Err(ConvertError::EmptySource);
    }

    let target_h = target_height(source.width(), source.height(), target_width);
    if u64::from(target_width) * u64::from(target_h) > MAX_OUTPUT_PIXELS {
        return Err(ConvertError::invalid(format!(
            "output of {target_width}x{target_h} dots exceeds {MAX_OUTPUT_PIXELS} pixels"
        )));
    }

    let resized = resize_to_width(&source.to_rgba8(), target_width);
    let gray = luminance(&resized);
    let lut = tone_curve(brightness, contrast);

    Ok(apply_curve(&gray, &lut).into())
}
