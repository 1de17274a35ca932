use thiserror::Error;

use crate::models::{Format, Side};

pub type Result<T> = std::result::Result<T, ConversionError>;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Malformed {format} coordinates: {message}")]
    MalformedInput { format: Format, message: String },

    #[error("I don't support that {side} coordinate type: '{name}'")]
    UnsupportedFormat { side: Side, name: String },

    #[error("{codec} codec rejected input: {message}")]
    CodecFailure { codec: &'static str, message: String },

    #[error("Required key missing in JSON: {0}")]
    MissingField(&'static str),

    #[error("Could not deserialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not deserialize JSON: {0}")]
    InvalidDocument(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    pub fn malformed(format: Format, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            format,
            message: message.into(),
        }
    }

    pub fn codec(codec: &'static str, message: impl Into<String>) -> Self {
        Self::CodecFailure {
            codec,
            message: message.into(),
        }
    }

    /// Short, stable name of the error class, used in batch output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "malformed_input",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::CodecFailure { .. } => "codec_failure",
            Self::MissingField(_) => "missing_field",
            Self::Json(_) | Self::InvalidDocument(_) => "json",
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::WorkerPool(_) => "worker_pool",
            Self::Io(_) => "io",
        }
    }
}
