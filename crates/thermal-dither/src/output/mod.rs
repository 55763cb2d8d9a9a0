//! Dithered output: the 1-bit image type and the file writer.

mod monochrome;
mod writer;

pub use monochrome::MonochromeImage;
pub use writer::{encode_png, write, OutputNamer, OUTPUT_EXTENSION};
