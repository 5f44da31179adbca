//! Error types for surface image generation.

use thiserror::Error;

/// Result type alias using SurfaceError.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors that can occur while building, fitting or exporting a surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Malformed construction parameters or inputs.
    #[error("invalid value for '{param}': {message}")]
    InvalidArgument { param: String, message: String },

    /// Too few (or degenerate) points for the requested operation.
    #[error("insufficient data for {context}: need at least {required} points, have {actual}")]
    InsufficientData {
        required: usize,
        actual: usize,
        context: String,
    },

    /// Save or encode requested before any image was generated.
    #[error("no image has been generated")]
    NoImageGenerated,

    /// Filesystem failure while creating directories or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image codec rejected the data or the output format.
    #[error("image encoding failed: {0}")]
    Encode(String),

    /// A configuration source could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SurfaceError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an InsufficientData error.
    pub fn insufficient_data(required: usize, actual: usize, context: impl Into<String>) -> Self {
        Self::InsufficientData {
            required,
            actual,
            context: context.into(),
        }
    }
}

impl From<image::ImageError> for SurfaceError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Self::Io(e),
            other => Self::Encode(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SurfaceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for SurfaceError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(format!("YAML error: {}", err))
    }
}
