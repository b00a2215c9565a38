//! Core error types and utilities

use thiserror::Error;

/// Fatal conditions that terminate a supervisor run
///
/// Cancellation is not represented here; a cancelled run returns
/// [`RunOutcome::Cancelled`](crate::supervisor::RunOutcome) cleanly.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A command could not be started (missing executable, permissions,
    /// fork/exec failure)
    #[error("failed to launch process: {0}")]
    LaunchFailure(String),

    /// Every health probe attempt failed; the main command never starts
    #[error("health check did not pass within {attempts} attempts")]
    HealthCheckExhausted {
        /// Number of probe attempts that were made
        attempts: u32,
    },

    /// The configured health check kind is not supported; no probes are
    /// attempted
    #[error("unknown health check kind: {0}")]
    UnknownHealthCheckKind(String),

    /// The main command exited with a non-success status
    #[error("main command failed: {0}")]
    MainProcessFailed(String),

    /// Delivering the termination signal to the pre-exec process failed
    #[error("failed to stop pre-exec process: {0}")]
    TeardownFailed(String),

    /// Waiting on a child process failed at the OS level
    #[error("failed to wait for process: {0}")]
    ProcessWait(String),
}

/// Core-specific result type
pub type Result<T> = std::result::Result<T, CoreError>;
