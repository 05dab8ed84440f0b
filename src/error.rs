//! Error types for aura_vision.
//!
//! Classification itself never fails: "no clear color" and "nobody in frame"
//! are ordinary outcomes. Errors are reserved for broken contracts at the
//! edges, a frame buffer of the wrong shape or an unreadable configuration.

use std::path::PathBuf;
use thiserror::Error;

/// A frame buffer that violates the analysis contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame buffer holds {actual} bytes, expected {expected} (width * height * 4)")]
    BufferSize { expected: usize, actual: usize },

    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Values parsed but cannot drive a pipeline
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
