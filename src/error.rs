//! Error types for the token gate

use thiserror::Error;

/// Result type alias for token gate operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Main error type for token gate operations
#[derive(Error, Debug)]
pub enum GateError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed URL
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON-RPC error object returned by the node
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Contract return data could not be decoded
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed account address from a request
    #[error("Invalid address: {value}")]
    InvalidAddress { value: String },

    /// No post with this slug
    #[error("Post not found: {slug}")]
    PostNotFound { slug: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GateError {
    /// Create an RPC error
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid address error
    pub fn invalid_address(value: impl Into<String>) -> Self {
        Self::InvalidAddress {
            value: value.into(),
        }
    }

    /// Create a post not found error
    pub fn post_not_found(slug: impl Into<String>) -> Self {
        Self::PostNotFound { slug: slug.into() }
    }
}
