//! One-shot supervision of a pre-exec/main command pair
//!
//! The supervisor runs a [`RunSpec`] exactly once: it launches the pre-exec
//! command in its own process group, optionally gates on its health check,
//! launches the main command with inherited stdio, waits for the main
//! command to exit while observing cancellation, and finally signals the
//! pre-exec group to stop.
//!
//! ```text
//! launch pre-exec → (health gate)? → launch main → wait-or-cancel → teardown
//! ```
//!
//! The wait is the only concurrent part: one spawned task awaits the main
//! command's exit into a oneshot channel, and the orchestrator races that
//! channel against the run's cancellation token.

use crate::health::gate::{self, GateVerdict};
use crate::process::{self, ChildProcess};
use crate::{CoreError, Result};
use schema::RunSpec;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[cfg(test)]
mod run_tests;

/// How a run ended when no fatal error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The main command exited successfully and the pre-exec command was
    /// signaled to stop
    Completed,
    /// The run's cancellation token fired before the main command exited
    Cancelled,
}

/// One-shot supervisor for a pre-exec/main command pair
pub struct Supervisor {
    spec: RunSpec,
}

impl Supervisor {
    /// Create a supervisor for the given run specification
    pub fn new(spec: RunSpec) -> Self {
        Self { spec }
    }

    /// Execute the run to completion
    ///
    /// Cancelling `cancel` at any point makes the run return
    /// [`RunOutcome::Cancelled`] promptly; the abandoned process handles
    /// request OS termination of anything still running (kill-on-drop).
    /// Every fatal exit path first attempts to stop the pre-exec process.
    pub async fn run(self, cancel: CancellationToken) -> Result<RunOutcome> {
        let RunSpec { pre_exec, main } = self.spec;

        let mut sidecar = process::spawn_detached(&pre_exec.process)?;
        debug!(
            pid = sidecar.pid(),
            command = %pre_exec.process.program,
            "pre-exec command started"
        );

        if let Some(check) = &pre_exec.health_check {
            match gate::wait_healthy(check, &cancel).await {
                Ok(GateVerdict::Healthy) => {}
                Ok(GateVerdict::Cancelled) => {
                    debug!("run cancelled during health gating");
                    return Ok(RunOutcome::Cancelled);
                }
                Err(err) => {
                    // Gate failures abort the run before main starts; the
                    // pre-exec process goes down with it
                    if let Err(teardown_err) = shut_down_pre_exec(&mut sidecar) {
                        warn!(error = %teardown_err, "failed to stop pre-exec after gate failure");
                    }
                    return Err(err);
                }
            }
        }

        let mut main_child = match process::spawn_foreground(&main) {
            Ok(child) => child,
            Err(err) => {
                if let Err(teardown_err) = shut_down_pre_exec(&mut sidecar) {
                    warn!(error = %teardown_err, "failed to stop pre-exec after launch failure");
                }
                return Err(err);
            }
        };
        debug!(
            pid = main_child.pid(),
            command = %main.program,
            "main command started"
        );

        let (done_tx, done_rx) = oneshot::channel();
        let waiter_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                status = main_child.wait() => {
                    let _ = done_tx.send(status);
                }
                _ = waiter_cancel.cancelled() => {
                    // Dropping the handle requests OS termination
                }
            }
        });

        let status = tokio::select! {
            result = done_rx => match result {
                Ok(status) => status?,
                // The waiter drops the sender only on its cancellation arm
                Err(_) => return Ok(RunOutcome::Cancelled),
            },
            _ = cancel.cancelled() => {
                debug!("run cancelled while waiting for the main command");
                return Ok(RunOutcome::Cancelled);
            }
        };
        debug!(code = ?status.code(), "main command finished");

        // Teardown runs before the main status is judged
        shut_down_pre_exec(&mut sidecar)?;

        if !status.success() {
            return Err(CoreError::MainProcessFailed(status.to_string()));
        }

        Ok(RunOutcome::Completed)
    }
}

/// Signal the pre-exec process group to stop, unless it already exited
fn shut_down_pre_exec(sidecar: &mut ChildProcess) -> Result<()> {
    if sidecar.try_wait()?.is_some() {
        debug!(pid = sidecar.pid(), "pre-exec already finished");
        return Ok(());
    }

    debug!(pid = sidecar.pid(), "terminating pre-exec process group");
    process::signal_term_group(sidecar)
}
