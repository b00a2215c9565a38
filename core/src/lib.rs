//! Core functionality for the Outrigger supervisor
//!
//! This crate contains the process lifecycle and health-gating engine: it
//! launches a pre-exec command in its own process group, optionally waits
//! until that command reports healthy, launches the main command with
//! inherited stdio, and tears the pre-exec command down once the main
//! command exits or the run is cancelled.
//!
//! Logging goes through `tracing`; installing a subscriber is left to the
//! embedding binary.

pub mod error;
pub mod health;
#[cfg(unix)]
pub mod process;
#[cfg(unix)]
pub mod supervisor;

pub use error::{CoreError, Result};
#[cfg(unix)]
pub use supervisor::{RunOutcome, Supervisor};
