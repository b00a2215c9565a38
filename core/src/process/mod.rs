//! Process management for the Outrigger supervisor
//!
//! This module launches the supervised commands and delivers termination
//! signals. The pre-exec command is placed in its own process group so that
//! signals aimed at the supervisor (e.g. terminal Ctrl-C) do not reach it;
//! the main command stays in the supervisor's group and inherits its stdio.
//!
//! ## Platform Support
//!
//! Unix only: isolation relies on `setsid()` process groups.

#[cfg(unix)]
pub mod unix;

#[cfg(unix)]
pub use unix::*;
