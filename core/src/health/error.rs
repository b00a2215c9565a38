//! Error types for health checking operations

use std::time::Duration;
use thiserror::Error;

/// Failure reasons for a single probe attempt
#[derive(Error, Debug)]
pub enum HealthError {
    /// The probe timed out
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// TCP connection failed
    #[error("tcp connection failed: {0}")]
    Tcp(#[from] std::io::Error),

    /// HTTP request failed before a response arrived
    #[error("http request failed: {0}")]
    Http(#[from] hyper::Error),

    /// The endpoint responded with a non-success status
    #[error("status code is not success: {0}")]
    UnexpectedStatus(u16),

    /// The probe URL could not be parsed
    #[error("invalid probe url: {0}")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),

    /// The probe request could not be built
    #[error("failed to build probe request: {0}")]
    Request(#[from] hyper::http::Error),
}
