//! Loudness Normalizer CLI Library
//!
//! Configuration loading and parameter resolution for the `loudnorm` binary.
//!
//! This library exposes the core components for testing purposes.

pub mod config;
pub mod error;

pub use config::{AppConfig, ParamOverrides};
pub use error::{CliError, Result};
