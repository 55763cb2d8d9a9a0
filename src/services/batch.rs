//! Batch conversion of a file or directory tree.
//!
//! One configuration is applied to every image found. A file that fails to
//! decode or write is recorded in the report and the batch moves on; only
//! problems that make the whole run meaningless (bad parameters, missing
//! input) abort it.

use std::fmt;
use std::path::{Path, PathBuf};

use thermal_dither::output::{self, OutputNamer};
use thermal_dither::{ConvertError, DitherConfig};

/// File extensions picked up by a directory scan, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Error that stops a batch before any file is converted
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConvertError),

    #[error("Input path does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Cannot scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether `path` has one of the [`SUPPORTED_EXTENSIONS`]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Recursively list supported images under `dir`, sorted by path.
///
/// Symlinked directories are not descended into, so a link back to an
/// ancestor cannot loop. A subdirectory that cannot be read is logged and
/// skipped; only an unreadable `dir` itself is an error.
pub fn find_images(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut images = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = match std::fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(source) if current.as_path() == dir => {
                return Err(BatchError::Scan {
                    path: current,
                    source,
                })
            }
            Err(e) => {
                tracing::warn!(path = %current.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(path = %current.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                pending.push(path);
            } else if is_supported_image(&path) && (file_type.is_file() || path.is_file()) {
                // Symlinks to files are followed, symlinks to directories are not
                images.push(path);
            }
        }
    }

    images.sort();
    Ok(images)
}

/// Result of converting one source file
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    /// Written output path, or the error that stopped this file
    pub result: Result<PathBuf, ConvertError>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = display_name(&self.source);
        match &self.result {
            Ok(output) => write!(f, "{name} -> {}", display_name(output)),
            Err(e) => write!(f, "{name}: {e}"),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Per-file outcomes of a batch run, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("{} succeeded, {} failed", self.succeeded(), self.failed())
    }
}

/// Applies one [`DitherConfig`] to many files
#[derive(Debug, Clone)]
pub struct BatchConverter {
    config: DitherConfig,
    keep_existing: bool,
}

impl BatchConverter {
    pub fn new(config: DitherConfig) -> Self {
        Self {
            config,
            keep_existing: false,
        }
    }

    /// Never overwrite files already present in the output directory
    pub fn keep_existing(mut self, enabled: bool) -> Self {
        self.keep_existing = enabled;
        self
    }

    pub fn config(&self) -> &DitherConfig {
        &self.config
    }

    /// Convert `input` (a single file or a directory tree) into `output_dir`
    pub fn run(&self, input: &Path, output_dir: &Path) -> Result<BatchReport, BatchError> {
        self.run_with_progress(input, output_dir, |_, _, _| {})
    }

    /// Like [`run`](Self::run), calling `on_file(index, total, outcome)` after
    /// each file with a 1-based index.
    pub fn run_with_progress<F>(
        &self,
        input: &Path,
        output_dir: &Path,
        mut on_file: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: FnMut(usize, usize, &FileOutcome),
    {
        self.config.validate()?;

        if !input.exists() {
            return Err(BatchError::MissingInput(input.to_path_buf()));
        }

        let sources = if input.is_dir() {
            find_images(input)?
        } else {
            vec![input.to_path_buf()]
        };

        tracing::info!(
            input = %input.display(),
            output_dir = %output_dir.display(),
            files = sources.len(),
            algorithm = %self.config.algorithm,
            width = self.config.target_width,
            brightness = self.config.brightness,
            contrast = self.config.contrast,
            "Starting batch conversion"
        );

        let mut namer = OutputNamer::new(output_dir).keep_existing(self.keep_existing);
        let mut report = BatchReport::default();
        let total = sources.len();

        for (index, source) in sources.into_iter().enumerate() {
            let result = self.convert_one(&source, output_dir, &mut namer);
            if let Err(e) = &result {
                tracing::warn!(source = %source.display(), error = %e, "Conversion failed");
            }

            let outcome = FileOutcome { source, result };
            on_file(index + 1, total, &outcome);
            report.outcomes.push(outcome);
        }

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch conversion finished"
        );

        Ok(report)
    }

    fn convert_one(
        &self,
        source: &Path,
        output_dir: &Path,
        namer: &mut OutputNamer,
    ) -> Result<PathBuf, ConvertError> {
        let mono = thermal_dither::convert_file(source, &self.config)?;
        let filename = namer.name_for(source);
        output::write(&mono, output_dir, &filename)
    }
}
