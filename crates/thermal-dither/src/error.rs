//! Error types for the conversion pipeline.
//!
//! Every failure the pipeline can produce is a deterministic function of its
//! input, so none of these are retried internally.

use std::path::PathBuf;
use thiserror::Error;

/// Broad failure category, used by front ends to decide how to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A parameter was out of range or unrecognized.
    InvalidParameter,
    /// The source image could not be read or decoded.
    Decode,
    /// The output could not be written.
    Io,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Decoded fine but has zero width or height.
    #[error("Source image has no pixels")]
    EmptySource,

    #[error("Cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ConvertError::Decode { .. } | ConvertError::EmptySource => ErrorKind::Decode,
            ConvertError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ConvertError::InvalidParameter(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
