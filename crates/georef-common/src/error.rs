//! Error types for the georeferencing workspace.

use thiserror::Error;

/// Result type alias using GeorefError.
pub type GeorefResult<T> = Result<T, GeorefError>;

/// Primary error type for warp fitting and configuration.
#[derive(Debug, Error)]
pub enum GeorefError {
    // === Control point errors ===
    #[error("Degenerate control-point configuration: {0}")]
    Configuration(String),

    #[error("Singular system at column {column}: pivot magnitude {pivot:e} is below tolerance")]
    SingularSystem { column: usize, pivot: f64 },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // === Input errors ===
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GeorefError {
    /// Shorthand for a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        GeorefError::Configuration(message.into())
    }

    /// True when the error means the control points cannot produce a usable warp.
    ///
    /// Callers use this to refuse image placement instead of rendering a broken warp.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            GeorefError::Configuration(_) | GeorefError::SingularSystem { .. }
        )
    }
}

impl From<serde_yaml::Error> for GeorefError {
    fn from(err: serde_yaml::Error) -> Self {
        GeorefError::Parse(format!("YAML error: {}", err))
    }
}
