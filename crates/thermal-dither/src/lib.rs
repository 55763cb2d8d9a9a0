//! thermal-dither: photo to 1-bit conversion for thermal receipt printers
//!
//! Thermal print heads burn a dot or leave the paper blank, so photos have
//! to be reduced to pure black and white before printing. This crate scales
//! a photo to the printer's dot width, flattens it to grey and applies an
//! error diffusion dither.
//!
//! # Quick Start
//!
//! ```
//! use thermal_dither::image::{DynamicImage, Rgb, RgbImage};
//! use thermal_dither::{convert_image, DitherAlgorithm, DitherConfig};
//!
//! let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([90, 120, 150])));
//! let config = DitherConfig::new().algorithm(DitherAlgorithm::FloydSteinberg);
//!
//! let mono = convert_image(&photo, &config).unwrap();
//! assert_eq!(mono.width(), 384);
//! assert_eq!(mono.height(), 192);
//! ```
//!
//! # Pipeline
//!
//! 1. [`preprocess`]: resize, luminance, brightness, contrast
//! 2. [`dither`]: error diffusion to one bit per pixel
//! 3. [`output`]: 1-bit PNG encoding and atomic file writes
//!
//! Each stage is a pure function of its inputs. Converting the same photo
//! with the same [`DitherConfig`] always yields identical pixels, which lets
//! a preview shown on screen match the printed result exactly.

pub mod config;
pub mod dither;
pub mod error;
pub mod output;
pub mod preprocess;

pub use config::{DitherConfig, DEFAULT_WIDTH, MAX_OUTPUT_PIXELS, MAX_WIDTH};
pub use dither::{dither, DitherAlgorithm, Kernel};
pub use error::{ConvertError, ErrorKind, Result};
pub use output::{MonochromeImage, OutputNamer};
pub use preprocess::GrayscaleImage;

pub use image;

use std::path::Path;

use image::DynamicImage;

/// Convert an already decoded image.
pub fn convert_image(source: &DynamicImage, config: &DitherConfig) -> Result<MonochromeImage> {
    config.validate()?;
    let gray = preprocess::preprocess(
        source,
        config.target_width,
        config.brightness,
        config.contrast,
    )?;
    Ok(dither::dither(&gray, config.algorithm))
}

/// Decode `path` and convert it.
///
/// The configuration is checked before the file is opened, so an invalid
/// parameter is reported even when the file is also unreadable.
pub fn convert_file(path: &Path, config: &DitherConfig) -> Result<MonochromeImage> {
    config.validate()?;
    let source = preprocess::load_source(path)?;

    let mono = convert_image(&source, config)?;
    tracing::debug!(
        path = %path.display(),
        algorithm = %config.algorithm,
        width = mono.width(),
        height = mono.height(),
        "Converted image"
    );
    Ok(mono)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use pretty_assertions::assert_eq;

    fn mid_grey(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([128, 128, 128])))
    }

    #[test]
    fn test_mid_grey_floyd_steinberg() {
        let config = DitherConfig::new().algorithm(DitherAlgorithm::FloydSteinberg);
        let mono = convert_image(&mid_grey(768, 384), &config).unwrap();

        assert_eq!((mono.width(), mono.height()), (384, 192));

        let total = mono.pixels().len() as f64;
        let black_ratio = mono.black_count() as f64 / total;
        assert!(
            (black_ratio - 0.5).abs() < 0.05,
            "black ratio {black_ratio} too far from one half"
        );

        let again = convert_image(&mid_grey(768, 384), &config).unwrap();
        assert_eq!(mono, again);
    }

    #[test]
    fn test_every_algorithm_is_deterministic() {
        let photo = DynamicImage::ImageRgb8(RgbImage::from_fn(120, 80, |x, y| {
            Rgb([(x * 2) as u8, (y * 3) as u8, ((x + y) % 256) as u8])
        }));
        for algorithm in DitherAlgorithm::ALL {
            let config = DitherConfig::new().algorithm(algorithm).target_width(96);
            let first = convert_image(&photo, &config).unwrap();
            let second = convert_image(&photo, &config).unwrap();
            assert_eq!(first, second, "{algorithm} not reproducible");
            assert_eq!(first.width(), 96);
            assert_eq!(first.height(), 64);
        }
    }

    #[test]
    fn test_output_is_binary() {
        let mono = convert_image(&mid_grey(50, 50), &DitherConfig::default()).unwrap();
        assert!(mono.to_luma().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_white_stays_white_black_stays_black() {
        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 32, Rgb([255; 3])));
        let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 32, Rgb([0; 3])));
        for algorithm in DitherAlgorithm::ALL {
            let config = DitherConfig::new().algorithm(algorithm);
            assert_eq!(convert_image(&white, &config).unwrap().black_count(), 0);
            let mono = convert_image(&black, &config).unwrap();
            assert_eq!(mono.black_count(), mono.pixels().len());
        }
    }

    #[test]
    fn test_convert_file_validates_before_decode() {
        let config = DitherConfig::new().brightness(150);
        let err = convert_file(Path::new("/definitely/not/here.jpg"), &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_convert_file_missing_is_decode_error() {
        let err =
            convert_file(Path::new("/definitely/not/here.jpg"), &DitherConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_convert_file_corrupt_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"this is not a jpeg").unwrap();

        let err = convert_file(&path, &DitherConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_convert_file_roundtrip_through_writer() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        RgbImage::from_fn(40, 20, |x, _| Rgb([(x * 6) as u8; 3]))
            .save(&source)
            .unwrap();

        let config = DitherConfig::new().target_width(40);
        let mono = convert_file(&source, &config).unwrap();
        let written = output::write(&mono, &dir.path().join("out"), "photo.png").unwrap();

        let decoded = image::open(&written).unwrap().to_luma8();
        assert_eq!(decoded.as_raw(), mono.to_luma().as_raw());
    }
}
