//! Error types for provconf.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for provconf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for provconf.
#[derive(Error, Debug)]
pub enum Error {
    // Config lookup errors (10-19)
    #[error("no config file found for '{name}'")]
    ConfigNotFound { name: String },

    #[error("unsupported config file extension '{0}'")]
    UnsupportedFormat(String),

    #[error("{format} support is not compiled in; enable the '{feature}' feature")]
    MissingDependency {
        format: &'static str,
        feature: &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),

    // Container errors (20-29)
    #[error("key '{0}' collides with a reserved container operation")]
    ReservedKey(String),

    #[error("key not found: '{0}'")]
    KeyNotFound(String),

    // Codec errors (30-39)
    #[error("failed to parse {format} config{}: {message}", source_suffix(.path))]
    Parse {
        format: &'static str,
        path: Option<PathBuf>,
        message: String,
    },

    #[error("{format} document root must be a mapping, got {found}")]
    NotAMapping {
        format: &'static str,
        found: &'static str,
    },

    // Export errors (40-49)
    #[error("cannot export '{key}' to the environment: unsupported {kind} value")]
    EnvExport { key: String, kind: &'static str },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Environment errors (70-79)
    #[error("logging initialization failed: {0}")]
    Logging(String),
}

fn source_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" '{}'", p.display()),
        None => String::new(),
    }
}

impl Error {
    /// Returns the error code for this error type.
    pub fn code(&self) -> u32 {
        match self {
            Error::ConfigNotFound { .. } => 10,
            Error::UnsupportedFormat(_) => 11,
            Error::MissingDependency { .. } => 12,
            Error::Config(_) => 13,
            Error::ReservedKey(_) => 20,
            Error::KeyNotFound(_) => 21,
            Error::Parse { .. } => 30,
            Error::NotAMapping { .. } => 31,
            Error::EnvExport { .. } => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Logging(_) => 70,
        }
    }

    /// Whether this error means "nothing was found", the one condition the
    /// loader recovers from.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ConfigNotFound { .. })
    }
}
