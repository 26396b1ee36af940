//! Error types for DICOMweb client operations

use thiserror::Error;

/// Result type alias for DICOMweb client operations
pub type Result<T> = std::result::Result<T, DicomWebError>;

/// Error types that can occur while building, sending or decoding
/// DICOMweb requests
#[derive(Error, Debug)]
pub enum DicomWebError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed multipart message: {0}")]
    MalformedMessage(String),

    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Unsupported transfer syntax: {0}")]
    UnsupportedTransferSyntax(String),

    #[error("No acceptable media type remains after filtering")]
    NoAcceptableMediaType,

    #[error("No media types provided")]
    NoMediaTypesProvided,

    #[error("No common media type could be determined")]
    NoCommonMediaType,

    #[error("Mixed media types: {0}")]
    MixedMediaTypes(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Request to {url} failed with status {status}")]
    Http {
        status: http::StatusCode,
        url: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DicomWebError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new malformed multipart message error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedMessage(msg.into())
    }

    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether the error was raised before any request was sent
    pub fn is_preflight(&self) -> bool {
        !matches!(
            self,
            DicomWebError::Http { .. }
                | DicomWebError::Transport(_)
                | DicomWebError::MalformedMessage(_)
                | DicomWebError::Serialization(_)
        )
    }
}
