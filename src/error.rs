//! Error types for batch conversion operations

use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error types raised while converting a batch of images
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure talking to a remote service
    #[error("Network error: {message}: {source}")]
    Network {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Remote service answered with a non-success status
    #[error("{service} returned HTTP {status}: {body}")]
    HttpStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Remote service answered with a payload we could not interpret
    #[error("Malformed response from {service}: {details}")]
    MalformedResponse {
        service: &'static str,
        details: String,
    },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A credential required by the selected mode is not set
    #[error("Missing credential: set the {0} environment variable")]
    MissingCredential(&'static str),
}

impl ConvertError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a network error wrapping the underlying transport error
    pub fn network_error<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Network {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Create an HTTP status error, keeping the response body for diagnostics
    pub fn http_status<S: Into<String>>(service: &'static str, status: u16, body: S) -> Self {
        Self::HttpStatus {
            service,
            status,
            body: body.into(),
        }
    }

    pub fn malformed_response<S: Into<String>>(service: &'static str, details: S) -> Self {
        Self::MalformedResponse {
            service,
            details: details.into(),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }
}
