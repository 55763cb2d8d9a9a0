pub mod config;

pub use config::{AppConfig, ConversionDefaults, CONFIG_FILE_ENV};
