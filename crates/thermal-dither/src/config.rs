//! Per-invocation conversion settings.
//!
//! [`DitherConfig`] bundles everything a single conversion depends on. It is
//! a plain value: front ends build one per request and nothing holds on to it
//! between conversions.

use crate::dither::DitherAlgorithm;
use crate::error::{ConvertError, Result};

/// Printable dot width of the 58 mm thermal printer.
pub const DEFAULT_WIDTH: u32 = 384;

/// Widest output accepted. Receipt heads top out well below this.
pub const MAX_WIDTH: u32 = 4096;

/// Largest output (width x height) the pipeline will allocate.
pub const MAX_OUTPUT_PIXELS: u64 = 16 * 1024 * 1024;

/// Accepted brightness range (inclusive).
pub const BRIGHTNESS_RANGE: (i32, i32) = (-100, 100);

/// Accepted contrast range (inclusive).
pub const CONTRAST_RANGE: (f32, f32) = (0.0, 2.0);

/// Configuration for one conversion.
///
/// # Defaults
///
/// - algorithm: [`DitherAlgorithm::AtkinsonPlus`]
/// - brightness: `0`
/// - contrast: `1.0`
/// - target width: [`DEFAULT_WIDTH`]
///
/// # Example
///
/// ```
/// use thermal_dither::{DitherAlgorithm, DitherConfig};
///
/// let config = DitherConfig::new()
///     .algorithm(DitherAlgorithm::Stucki)
///     .brightness(20)
///     .contrast(1.3);
///
/// assert!(config.validate().is_ok());
/// assert!(DitherConfig::new().contrast(-0.5).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherConfig {
    pub algorithm: DitherAlgorithm,

    /// Additive brightness shift, -100..=100. The full scale maps to
    /// +/-128 grey levels.
    pub brightness: i32,

    /// Contrast factor around mid-grey, 0.0..=2.0.
    pub contrast: f32,

    /// Output width in dots. Height follows the source aspect ratio.
    pub target_width: u32,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            algorithm: DitherAlgorithm::default(),
            brightness: 0,
            contrast: 1.0,
            target_width: DEFAULT_WIDTH,
        }
    }
}

impl DitherConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn algorithm(mut self, algorithm: DitherAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[inline]
    pub fn brightness(mut self, brightness: i32) -> Self {
        self.brightness = brightness;
        self
    }

    #[inline]
    pub fn contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }

    #[inline]
    pub fn target_width(mut self, width: u32) -> Self {
        self.target_width = width;
        self
    }

    /// Check every parameter against its accepted range.
    ///
    /// Out-of-range values are rejected rather than clamped.
    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 {
            return Err(ConvertError::invalid("width must be a positive integer"));
        }
        if self.target_width > MAX_WIDTH {
            return Err(ConvertError::invalid(format!(
                "width {} exceeds maximum of {MAX_WIDTH}",
                self.target_width
            )));
        }

        let (min_b, max_b) = BRIGHTNESS_RANGE;
        if !(min_b..=max_b).contains(&self.brightness) {
            return Err(ConvertError::invalid(format!(
                "brightness {} outside {min_b}..={max_b}",
                self.brightness
            )));
        }

        let (min_c, max_c) = CONTRAST_RANGE;
        if !self.contrast.is_finite() || !(min_c..=max_c).contains(&self.contrast) {
            return Err(ConvertError::invalid(format!(
                "contrast {} outside {min_c:.1}..={max_c:.1}",
                self.contrast
            )));
        }

        Ok(())
    }
}
