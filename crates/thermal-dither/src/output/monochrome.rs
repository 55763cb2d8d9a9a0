//! MonochromeImage, the canonical output of the dither engine.

use image::{GrayImage, Luma};

/// A strictly two-tone image.
///
/// Stores one `bool` per pixel in row-major order, `true` for white (paper)
/// and `false` for black (burnt dot). There is no third value, so no grey can
/// survive dithering.
///
/// # Example
///
/// ```
/// use thermal_dither::MonochromeImage;
///
/// let image = MonochromeImage::new(vec![true, false, false, true], 2, 2);
///
/// assert_eq!(image.width(), 2);
/// assert_eq!(image.black_count(), 2);
/// assert!(image.is_white(0, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeImage {
    white: Vec<bool>,
    width: u32,
    height: u32,
}

impl MonochromeImage {
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `white.len() == width * height`.
    pub fn new(white: Vec<bool>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            white.len(),
            (width * height) as usize,
            "pixel count ({}) must match {}x{}",
            white.len(),
            width,
            height,
        );
        Self {
            white,
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

    #[inline]
    pub fn is_white(&self, x: u32, y: u32) -> bool {
        self.white[(y * self.width + x) as usize]
    }

    /// Row-major pixel values, `true` for white.
    #[inline]
    pub fn pixels(&self) -> &[bool] {
        &self.white
    }

    /// Number of dots the printer will burn.
    pub fn black_count(&self) -> usize {
        self.white.iter().filter(|&&w| !w).count()
    }

    /// Expand to an 8-bit image holding only 0 and 255.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.is_white(x, y) { 255 } else { 0 }])
        })
    }

    /// Pack pixels at one bit each, MSB first, 1 = white.
    ///
    /// Every row starts on a byte boundary; trailing bits of the last byte
    /// in a row are zero.
    pub fn packed_rows(&self) -> Vec<u8> {
        let bytes_per_row = (self.width as usize).div_ceil(8);
        let mut packed = Vec::with_capacity(bytes_per_row * self.height as usize);

        for row in self.white.chunks(self.width.max(1) as usize) {
            let mut byte = 0u8;
            for (i, &white) in row.iter().enumerate() {
                if white {
                    byte |= 0x80 >> (i % 8);
                }
                if i % 8 == 7 || i == row.len() - 1 {
                    packed.push(byte);
                    byte = 0;
                }
            }
        }

        packed
    }
}
