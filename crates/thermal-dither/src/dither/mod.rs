//! Error diffusion dithering to 1-bit output.
//!
//! # Algorithms
//!
//! Five kernels are available through [`DitherAlgorithm`]:
//!
//! - **Atkinson+**: 87.5% propagation, tuned for receipts (default)
//! - **Atkinson**: 75% propagation, crisp but loses shadow detail
//! - **Floyd-Steinberg**: classic, 100% propagation
//! - **Sierra-2-4A**: two taps, fastest
//! - **Stucki**: twelve taps over three rows, smoothest gradients
//!
//! # Architecture
//!
//! Algorithms differ only in their [`Kernel`] table. One scan loop,
//! [`dither_with_kernel`], serves all of them: pixels are visited row-major,
//! left to right, top to bottom. There is no serpentine mode because later
//! pixels depend on earlier ones in a fixed order and output must be
//! reproducible bit for bit.
//!
//! # Threshold
//!
//! A pixel whose accumulated value is `>= 128` prints white, anything below
//! prints black. Exactly 128 therefore prints white.

mod kernel;

pub use kernel::*;

use std::fmt;
use std::str::FromStr;

use crate::error::ConvertError;
use crate::output::MonochromeImage;
use crate::preprocess::GrayscaleImage;

/// Accumulated values at or above this print white.
pub const THRESHOLD: f32 = 128.0;

const BLACK: f32 = 0.0;
const WHITE: f32 = 255.0;

/// Dither algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DitherAlgorithm {
    /// Tuned Atkinson variant (87.5% propagation).
    #[default]
    AtkinsonPlus,

    /// Classic Atkinson (75% propagation).
    Atkinson,

    /// Floyd-Steinberg (100% propagation, 4 neighbours).
    FloydSteinberg,

    /// Sierra-2-4A (100% propagation, 2 neighbours).
    Sierra24a,

    /// Stucki (100% propagation, 12 neighbours).
    Stucki,
}

impl DitherAlgorithm {
    /// Every algorithm, in canonical order.
    pub const ALL: [DitherAlgorithm; 5] = [
        DitherAlgorithm::AtkinsonPlus,
        DitherAlgorithm::Atkinson,
        DitherAlgorithm::FloydSteinberg,
        DitherAlgorithm::Sierra24a,
        DitherAlgorithm::Stucki,
    ];

    /// Canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            DitherAlgorithm::AtkinsonPlus => "atkinson_plus",
            DitherAlgorithm::Atkinson => "atkinson",
            DitherAlgorithm::FloydSteinberg => "floyd_steinberg",
            DitherAlgorithm::Sierra24a => "sierra24a",
            DitherAlgorithm::Stucki => "stucki",
        }
    }

    pub fn kernel(self) -> &'static Kernel {
        match self {
            DitherAlgorithm::AtkinsonPlus => &ATKINSON_PLUS,
            DitherAlgorithm::Atkinson => &ATKINSON,
            DitherAlgorithm::FloydSteinberg => &FLOYD_STEINBERG,
            DitherAlgorithm::Sierra24a => &SIERRA_24A,
            DitherAlgorithm::Stucki => &STUCKI,
        }
    }
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "atkinson+" {
            return Ok(DitherAlgorithm::AtkinsonPlus);
        }
        DitherAlgorithm::ALL
            .into_iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = DitherAlgorithm::ALL.iter().map(|a| a.name()).collect();
                ConvertError::invalid(format!(
                    "unknown algorithm '{}' (expected one of: {})",
                    s.trim(),
                    known.join(", ")
                ))
            })
    }
}

/// Pending quantization error for the rows a kernel can still reach.
///
/// Holds `max_dy + 1` rows instead of a full image-sized grid. A new buffer
/// is made for every image, so conversions never share error state.
///
/// Per row: read [`get_accumulated`](Self::get_accumulated) for each pixel,
/// push its error forward with [`add_error`](Self::add_error), then call
/// [`advance_row`](Self::advance_row) once the row is done.
#[derive(Debug)]
pub struct ErrorBuffer {
    /// rows[0] is the current row, rows[1] the next, and so on.
    rows: Vec<Vec<f32>>,
}

impl ErrorBuffer {
    /// `row_depth` is the kernel's `max_dy + 1`.
    pub fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth).map(|_| vec![0.0; width]).collect(),
        }
    }

    /// Error accumulated so far for pixel `x` of the current row.
    #[inline]
    pub fn get_accumulated(&self, x: usize) -> f32 {
        self.rows[0][x]
    }

    /// Credit `error` to column `x`, `row_offset` rows below the current one.
    ///
    /// Targets outside the window are ignored.
    #[inline]
    pub fn add_error(&mut self, x: usize, row_offset: usize, error: f32) {
        if let Some(cell) = self.rows.get_mut(row_offset).and_then(|row| row.get_mut(x)) {
            *cell += error;
        }
    }

    /// Sum of all pending error in the window.
    pub fn pending(&self) -> f32 {
        self.rows.iter().flatten().sum()
    }

    /// Rotate the window: the first row is discarded, subsequent rows shift
    /// forward, and a zeroed row is added at the end.
    pub fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(fresh) = self.rows.last_mut() {
            fresh.fill(0.0);
        }
    }
}

/// Hand `error` from pixel (x, y) to the kernel's neighbours.
///
/// Neighbours outside the image are skipped and their share is dropped.
#[inline]
pub(crate) fn diffuse_error(
    buffer: &mut ErrorBuffer,
    kernel: &Kernel,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    error: f32,
) {
    let divisor = f32::from(kernel.divisor);
    for &(dx, dy, weight) in kernel.entries {
        let nx = x as i32 + dx;
        let inside_row = (0..width as i32).contains(&nx);
        if inside_row {
            let ny = y + dy as usize;
            if ny < height {
                buffer.add_error(nx as usize, dy as usize, error * weight as f32 / divisor);
            }
        }
    }
}

/// Core error diffusion loop shared by every algorithm.
///
/// `pixels` holds `width * height` grey levels in row-major order. Returns
/// one `bool` per pixel, `true` for white.
pub fn dither_with_kernel(pixels: &[u8], width: usize, height: usize, kernel: &Kernel) -> Vec<bool> {
    debug_assert_eq!(pixels.len(), width * height);

    let mut output = vec![false; width * height];
    let mut buffer = ErrorBuffer::new(width, kernel.max_dy + 1);

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let value = pixels[idx] as f32 + buffer.get_accumulated(x);

            let white = value >= THRESHOLD;
            output[idx] = white;

            let error = value - if white { WHITE } else { BLACK };
            diffuse_error(&mut buffer, kernel, x, y, width, height, error);
        }
        buffer.advance_row();
    }

    output
}

/// Dither a greyscale image to pure black and white.
///
/// Deterministic: the same image and algorithm always give the same pixels.
pub fn dither(gray: &GrayscaleImage, algorithm: DitherAlgorithm) -> MonochromeImage {
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    let white = dither_with_kernel(gray.pixels(), width, height, algorithm.kernel());
    MonochromeImage::new(white, gray.width(), gray.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn gradient(width: u32, height: u32) -> GrayscaleImage {
        let pixels = (0..width * height)
            .map(|i| ((i % width) * 255 / (width - 1)) as u8)
            .collect();
        GrayscaleImage::from_luma(width, height, pixels)
    }

    #[test]
    fn test_parse_canonical_names() {
        for algorithm in DitherAlgorithm::ALL {
            assert_eq!(algorithm.name().parse::<DitherAlgorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_parse_alias_and_case() {
        assert_eq!(
            "atkinson+".parse::<DitherAlgorithm>().unwrap(),
            DitherAlgorithm::AtkinsonPlus
        );
        assert_eq!(
            " Floyd_Steinberg ".parse::<DitherAlgorithm>().unwrap(),
            DitherAlgorithm::FloydSteinberg
        );
    }

    #[test]
    fn test_parse_unknown_rejected() {
        let err = "unknown".parse::<DitherAlgorithm>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.to_string().contains("sierra24a"));
    }

    #[test]
    fn test_display_roundtrips_name() {
        assert_eq!(DitherAlgorithm::Sierra24a.to_string(), "sierra24a");
    }

    #[test]
    fn test_error_buffer_rotation() {
        let mut buf = ErrorBuffer::new(4, 3);
        buf.add_error(1, 1, 2.0);
        buf.add_error(2, 2, 3.0);
        buf.add_error(9, 0, 100.0); // out of bounds, ignored
        assert_eq!(buf.get_accumulated(1), 0.0);

        buf.advance_row();
        assert_eq!(buf.get_accumulated(1), 2.0);

        buf.advance_row();
        assert_eq!(buf.get_accumulated(2), 3.0);
        assert_eq!(buf.get_accumulated(1), 0.0, "rotated-in row must be zeroed");
    }

    #[test]
    fn test_interior_pixel_conservation() {
        for algorithm in DitherAlgorithm::ALL {
            let kernel = algorithm.kernel();
            let mut buf = ErrorBuffer::new(9, kernel.max_dy + 1);
            diffuse_error(&mut buf, kernel, 4, 0, 9, 9, 100.0);
            let expected = 100.0 * kernel.propagation();
            assert!(
                (buf.pending() - expected).abs() < 1e-3,
                "{algorithm}: propagated {} expected {expected}",
                buf.pending()
            );
        }
    }

    #[test]
    fn test_edge_pixel_drops_out_of_bounds_share() {
        // Bottom-right corner: every neighbour is outside the image.
        for algorithm in DitherAlgorithm::ALL {
            let kernel = algorithm.kernel();
            let mut buf = ErrorBuffer::new(5, kernel.max_dy + 1);
            diffuse_error(&mut buf, kernel, 4, 4, 5, 5, 100.0);
            assert_eq!(buf.pending(), 0.0, "{algorithm} wrapped or clamped error");
        }
    }

    #[test]
    fn test_left_edge_skips_negative_offsets() {
        // Floyd-Steinberg at x=0 loses its 3/16 bottom-left share.
        let mut buf = ErrorBuffer::new(4, 2);
        diffuse_error(&mut buf, &FLOYD_STEINBERG, 0, 0, 4, 4, 16.0);
        assert!((buf.pending() - 13.0).abs() < 1e-5);
        assert_eq!(buf.get_accumulated(3), 0.0, "no wrap to the previous row end");
    }

    #[test]
    fn test_output_dimensions() {
        let gray = gradient(17, 5);
        let mono = dither(&gray, DitherAlgorithm::Stucki);
        assert_eq!(mono.width(), 17);
        assert_eq!(mono.height(), 5);
    }

    #[test]
    fn test_solid_black_and_white_stay_solid() {
        for algorithm in DitherAlgorithm::ALL {
            let black = GrayscaleImage::from_luma(8, 8, vec![0; 64]);
            let white = GrayscaleImage::from_luma(8, 8, vec![255; 64]);
            assert_eq!(dither(&black, algorithm).black_count(), 64);
            assert_eq!(dither(&white, algorithm).black_count(), 0);
        }
    }

    #[test]
    fn test_threshold_tie_prints_white() {
        let gray = GrayscaleImage::from_luma(1, 1, vec![128]);
        let mono = dither(&gray, DitherAlgorithm::FloydSteinberg);
        assert!(mono.is_white(0, 0));

        let gray = GrayscaleImage::from_luma(1, 1, vec![127]);
        let mono = dither(&gray, DitherAlgorithm::FloydSteinberg);
        assert!(!mono.is_white(0, 0));
    }

    #[test]
    fn test_mid_gray_row_floyd_steinberg() {
        // 128 -> white (err -127), 128 - 127*7/16 -> black, then alternates.
        let gray = GrayscaleImage::from_luma(4, 1, vec![128; 4]);
        let mono = dither(&gray, DitherAlgorithm::FloydSteinberg);
        let row: Vec<bool> = (0..4).map(|x| mono.is_white(x, 0)).collect();
        assert_eq!(row, vec![true, false, true, false]);
    }

    #[test]
    fn test_sierra24a_single_row_alternates() {
        // Half the error goes right: 128 -> W (-127), 64.5 -> B (+64.5), 160.25 -> W
        let gray = GrayscaleImage::from_luma(3, 1, vec![128; 3]);
        let mono = dither(&gray, DitherAlgorithm::Sierra24a);
        assert!(mono.is_white(0, 0));
        assert!(!mono.is_white(1, 0));
        assert!(mono.is_white(2, 0));
    }

    #[test]
    fn test_deterministic() {
        let gray = gradient(64, 32);
        for algorithm in DitherAlgorithm::ALL {
            let a = dither(&gray, algorithm);
            let b = dither(&gray, algorithm);
            assert_eq!(a, b, "{algorithm} is not deterministic");
        }
    }

    #[test]
    fn test_algorithms_differ_on_gradient() {
        let gray = gradient(64, 32);
        let fs = dither(&gray, DitherAlgorithm::FloydSteinberg);
        let atkinson = dither(&gray, DitherAlgorithm::Atkinson);
        assert_ne!(fs, atkinson);
    }

    #[test]
    fn test_tone_preserved_for_full_propagation() {
        // A 25% grey field should come out roughly 75% black.
        let gray = GrayscaleImage::from_luma(64, 64, vec![64; 64 * 64]);
        for algorithm in [
            DitherAlgorithm::FloydSteinberg,
            DitherAlgorithm::Sierra24a,
            DitherAlgorithm::Stucki,
        ] {
            let black = dither(&gray, algorithm).black_count() as f32 / (64.0 * 64.0);
            assert!(
                (black - 0.75).abs() < 0.04,
                "{algorithm}: black ratio {black}"
            );
        }
    }
}
