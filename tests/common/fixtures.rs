//! Test fixtures: source images written to disk.

use std::path::{Path, PathBuf};
use thermal_dither::image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Horizontal grey ramp with a colour tint
pub fn write_gradient(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| {
        let v = (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8;
        Rgb([v, v.saturating_add((y % 16) as u8), v / 2])
    })
    .save(&path)
    .expect("Failed to write gradient fixture");
    path
}

/// Uniform grey image
pub fn write_solid(dir: &Path, name: &str, width: u32, height: u32, value: u8) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([value; 3]))
        .save(&path)
        .expect("Failed to write solid fixture");
    path
}

/// Fully transparent PNG (prints as blank paper)
pub fn write_transparent(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]))
        .save(&path)
        .expect("Failed to write transparent fixture");
    path
}

/// A file with an image extension but garbage contents
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\xff\xd8\xff\xe0 definitely not a real jpeg")
        .expect("Failed to write corrupt fixture");
    path
}
