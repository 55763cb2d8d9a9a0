//! Photoprint - photos for thermal receipt printers
//!
//! Batch conversion and interactive preview front ends over the
//! `thermal-dither` pipeline. This library exposes modules for integration
//! testing.

pub mod api;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
