//! Luminance extraction and tone adjustment.

use image::{GrayImage, Luma, RgbaImage};

/// Flatten colour (and alpha) to one luminance channel.
///
/// Alpha is composited over white paper first, then ITU-R BT.601 weights are
/// applied in 16.16 fixed point: `(19595 R + 38470 G + 7471 B + 0x8000) >> 16`.
pub fn luminance(image: &RgbaImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let (r, g, b) = (over_white(r, a), over_white(g, a), over_white(b, a));
        let luma = (19595 * r + 38470 * g + 7471 * b + 0x8000) >> 16;
        Luma([luma as u8])
    })
}

#[inline]
fn over_white(channel: u8, alpha: u8) -> u32 {
    let (c, a) = (channel as u32, alpha as u32);
    (c * a + 255 * (255 - a) + 127) / 255
}

/// Lookup table applying brightness then contrast to every grey level.
///
/// Brightness shifts by `brightness * 128 / 100` levels and is clamped to
/// 0..=255 before contrast scales around 128 and clamps again. The result is
/// truncated to an integer level.
pub fn tone_curve(brightness: i32, contrast: f32) -> [u8; 256] {
    let offset = brightness as f32 * 128.0 / 100.0;
    let mut lut = [0u8; 256];
    for (level, out) in lut.iter_mut().enumerate() {
        let shifted = (level as f32 + offset).clamp(0.0, 255.0);
        let scaled = ((shifted - 128.0) * contrast + 128.0).clamp(0.0, 255.0);
        *out = scaled as u8;
    }
    lut
}

/// Apply a [`tone_curve`] to every pixel, producing a new image.
pub fn apply_curve(image: &GrayImage, lut: &[u8; 256]) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    out
}
