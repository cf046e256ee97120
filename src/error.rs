//! Error types for EMF exposure analysis

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for EMF operations
pub type EmfResult<T> = Result<T, EmfError>;

/// Errors that can occur while building or running an exposure analysis
#[derive(Error, Debug)]
pub enum EmfError {
    /// Radiation pattern file could not be read or contained no usable data
    #[error("failed to load radiation pattern {path:?}: {reason}")]
    PatternLoad { path: PathBuf, reason: String },

    /// Configuration file could not be read or parsed
    #[error("failed to load configuration {path:?}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    /// Configuration parsed but failed validation
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Referenced antenna id is not present in the solver
    #[error("antenna not found: {0}")]
    AntennaNotFound(String),

    /// Report template rendering failed
    #[error("report rendering failed: {0}")]
    Render(#[from] minijinja::Error),

    /// Report serialization failed
    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] io::Error),
}
