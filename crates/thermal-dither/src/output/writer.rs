//! PNG encoding and atomic file output.

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use super::MonochromeImage;
use crate::error::{ConvertError, Result};

/// Extension of every file the writer produces.
pub const OUTPUT_EXTENSION: &str = "png";

/// Encode as a 1-bit greyscale PNG.
///
/// Written with maximum zlib compression, then recompressed losslessly by
/// oxipng. The pixel mode stays 1-bit greyscale.
pub fn encode_png(image: &MonochromeImage) -> std::io::Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::One);
        encoder.set_compression(png::Compression::Best);
        encoder.set_filter(png::FilterType::NoFilter);
        let mut writer = encoder.write_header().map_err(encoding_to_io)?;
        writer
            .write_image_data(&image.packed_rows())
            .map_err(encoding_to_io)?;
    }
    let png_bytes = buf.into_inner();

    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            color_type_reduction: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes);

    Ok(optimized)
}

fn encoding_to_io(err: png::EncodingError) -> std::io::Error {
    match err {
        png::EncodingError::IoError(e) => e,
        other => std::io::Error::other(other),
    }
}

/// Write `image` as `output_dir/filename`, creating the directory if needed.
///
/// The bytes go to a temporary file in `output_dir` that is then renamed
/// over the target, so a failed write never leaves a truncated image behind.
/// An existing file of the same name is replaced.
pub fn write(image: &MonochromeImage, output_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\'])
    {
        return Err(ConvertError::invalid(format!(
            "output filename '{filename}' must be a plain file name"
        )));
    }

    fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;

    let path = output_dir.join(filename);
    let bytes = encode_png(image).map_err(|e| ConvertError::io(&path, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".photoprint-")
        .suffix(".tmp")
        .tempfile_in(output_dir)
        .map_err(|e| ConvertError::io(output_dir, e))?;
    tmp.write_all(&bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| ConvertError::io(&path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| ConvertError::io(&path, e))?;
    }

    tmp.persist(&path)
        .map_err(|e| ConvertError::io(&path, e.error))?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        width = image.width(),
        height = image.height(),
        "Wrote dithered image"
    );

    Ok(path)
}

/// Allocates distinct output names for one batch run.
///
/// Names derive from the source file stem: `photo.jpg` becomes `photo.png`,
/// and a second `photo.*` in the same run becomes `photo_1.png`. With
/// `keep_existing` enabled, names of files already in the output directory
/// are skipped as well.
#[derive(Debug)]
pub struct OutputNamer {
    output_dir: PathBuf,
    taken: HashSet<String>,
    keep_existing: bool,
}

impl OutputNamer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            taken: HashSet::new(),
            keep_existing: false,
        }
    }

    #[inline]
    pub fn keep_existing(mut self, enabled: bool) -> Self {
        self.keep_existing = enabled;
        self
    }

    /// Reserve and return the output file name for `source`.
    pub fn name_for(&mut self, source: &Path) -> String {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "image".to_string());

        let mut candidate = format!("{stem}.{OUTPUT_EXTENSION}");
        let mut counter = 1;
        while self.is_taken(&candidate) {
            candidate = format!("{stem}_{counter}.{OUTPUT_EXTENSION}");
            counter += 1;
        }

        self.taken.insert(candidate.clone());
        candidate
    }

    fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name) || (self.keep_existing && self.output_dir.join(name).exists())
    }
}
