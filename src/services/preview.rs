//! Interactive preview sessions.
//!
//! A [`PreviewSession`] owns one decoded source image and the last preview
//! that converted successfully. Every parameter change reruns the whole
//! pipeline on the source; nothing is recomputed incrementally.

use std::path::{Path, PathBuf};

use thermal_dither::image::DynamicImage;
use thermal_dither::output::{self, OutputNamer};
use thermal_dither::preprocess::load_source;
use thermal_dither::{convert_image, ConvertError, DitherConfig, MonochromeImage};

/// One image being tuned for printing
#[derive(Debug)]
pub struct PreviewSession {
    source_path: PathBuf,
    source: DynamicImage,
    config: DitherConfig,
    preview: MonochromeImage,
}

impl PreviewSession {
    /// Open `path` with default parameters
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        Self::load_with(path, DitherConfig::default())
    }

    /// Open `path` and render the first preview with `config`
    pub fn load_with(path: &Path, config: DitherConfig) -> Result<Self, ConvertError> {
        config.validate()?;
        let source = load_source(path)?;
        let preview = convert_image(&source, &config)?;

        tracing::info!(
            path = %path.display(),
            source_width = source.width(),
            source_height = source.height(),
            "Preview session opened"
        );

        Ok(Self {
            source_path: path.to_path_buf(),
            source,
            config,
            preview,
        })
    }

    /// Rerun the pipeline with new parameters.
    ///
    /// On error the previous preview and parameters stay in place.
    pub fn update(&mut self, config: DitherConfig) -> Result<&MonochromeImage, ConvertError> {
        let preview = convert_image(&self.source, &config)?;
        self.config = config;
        self.preview = preview;
        Ok(&self.preview)
    }

    /// Last successful preview
    pub fn preview(&self) -> &MonochromeImage {
        &self.preview
    }

    pub fn config(&self) -> DitherConfig {
        self.config
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Write the current preview into `output_dir`.
    ///
    /// An explicit `filename` overwrites whatever is there. Without one the
    /// name is `<source stem>.png`, or `<stem>_1.png`, `<stem>_2.png`, ... if
    /// that is already taken, so earlier saves are never replaced.
    pub fn save(&self, output_dir: &Path, filename: Option<&str>) -> Result<PathBuf, ConvertError> {
        let filename = match filename {
            Some(name) => name.to_string(),
            None => OutputNamer::new(output_dir)
                .keep_existing(true)
                .name_for(&self.source_path),
        };
        let path = output::write(&self.preview, output_dir, &filename)?;
        tracing::info!(source = %self.source_path.display(), path = %path.display(), "Preview saved");
        Ok(path)
    }
}
