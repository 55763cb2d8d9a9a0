use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use thermal_dither::{DitherAlgorithm, DitherConfig, DEFAULT_WIDTH};

use crate::services::session_registry::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS};

/// Environment variable naming the YAML configuration file.
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Conversion parameters used when the caller does not override them
    #[serde(default)]
    pub defaults: ConversionDefaults,

    /// Where converted photos are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Listen address for the preview server
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Preview sessions idle longer than this many seconds are dropped; 0 keeps them
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Open preview sessions kept before the least recently used is dropped
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/surprise_photos")
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_session_idle_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

/// Default conversion parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConversionDefaults {
    #[serde(deserialize_with = "deserialize_algorithm")]
    pub algorithm: DitherAlgorithm,

    /// Print width in dots
    pub width: u32,

    pub brightness: i32,

    pub contrast: f32,
}

impl Default for ConversionDefaults {
    fn default() -> Self {
        Self {
            algorithm: DitherAlgorithm::default(),
            width: DEFAULT_WIDTH,
            brightness: 0,
            contrast: 1.0,
        }
    }
}

fn deserialize_algorithm<'de, D>(deserializer: D) -> Result<DitherAlgorithm, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl ConversionDefaults {
    /// Build the core configuration. Not validated here.
    pub fn dither_config(&self) -> DitherConfig {
        DitherConfig::new()
            .algorithm(self.algorithm)
            .target_width(self.width)
            .brightness(self.brightness)
            .contrast(self.contrast)
    }
}

impl AppConfig {
    /// Load configuration from the file named by `CONFIG_FILE`, if set
    pub fn load() -> Self {
        match std::env::var_os(CONFIG_FILE_ENV) {
            Some(path) => Self::load_from_path(Path::new(&path)),
            None => {
                tracing::debug!("CONFIG_FILE not set, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a YAML file, falling back to defaults
    pub fn load_from_path(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    let config: Self = config;
                    tracing::info!(
                        path = %path.display(),
                        algorithm = %config.defaults.algorithm,
                        width = config.defaults.width,
                        output_dir = %config.output_dir.display(),
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: ConversionDefaults::default(),
            output_dir: default_output_dir(),
            bind_addr: default_bind_addr(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}
