//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

use crate::channel::ChannelError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("server returned {status} for {url}")]
    UnexpectedStatus { status: StatusCode, url: String },

    /// A response body did not parse.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// The kernel message channel failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Local file I/O failed (uploads).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
