//! Unix process launching and signaling using process groups
//!
//! The pre-exec command is spawned in its own session via `setsid()`, so it
//! is not automatically sent signals intended for the supervisor's group.
//! Termination targets the whole group by signaling the negative process ID
//! with `killpg`, taking down any children the command itself spawned.
//!
//! Both spawn paths arm tokio's kill-on-drop: abandoning a handle (the
//! cancellation paths of the supervisor) asks the OS to terminate the
//! process without an explicit signal call.

// Process-group setup requires a libc::setsid() call in the child
#![allow(unsafe_code)]

use crate::{CoreError, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use schema::ProcessSpec;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, error};

/// A child process handle owned by the supervisor
///
/// Wraps the OS pid together with the tokio child so the supervisor can
/// wait on the process and signal its group. Once the process has been
/// reaped, no further signaling is attempted.
#[derive(Debug)]
pub struct ChildProcess {
    /// The process ID of the spawned process
    pid: Pid,
    /// The underlying Child handle for waiting and status checking
    child: Child,
}

impl ChildProcess {
    /// Get the process ID
    pub fn pid(&self) -> u32 {
        self.pid.as_raw() as u32
    }

    /// Wait for the process to exit and return its exit status
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus> {
        self.child.wait().await.map_err(|e| {
            CoreError::ProcessWait(format!("failed to wait for process {}: {e}", self.pid))
        })
    }

    /// Check for an exit without blocking
    pub fn try_wait(&mut self) -> Result<Option<std::process::ExitStatus>> {
        self.child.try_wait().map_err(|e| {
            CoreError::ProcessWait(format!("failed to try_wait for process {}: {e}", self.pid))
        })
    }
}

/// Spawn a command detached from the supervisor: own process group, stdio
/// bound to null
///
/// Used for the pre-exec command. The child calls `setsid()` before exec,
/// which creates a new session and process group with the child as leader
/// and detaches it from the controlling terminal. The environment is
/// inherited from the supervisor.
pub fn spawn_detached(spec: &ProcessSpec) -> Result<ChildProcess> {
    debug!("spawning detached process: {} {:?}", spec.program, spec.args);

    let mut command = Command::new(&spec.program);
    command.args(&spec.args);
    command.stdin(Stdio::null());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());
    command.kill_on_drop(true);

    // Safety: setsid() is async-signal-safe and appropriate for use in
    // pre_exec, between fork and exec
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    finish_spawn(command, spec)
}

/// Spawn a command in the foreground: the supervisor's process group, with
/// stdin/stdout/stderr inherited verbatim
///
/// Used for the main command, so a wrapped CLI tool behaves as if it were
/// run directly. The environment is inherited from the supervisor.
pub fn spawn_foreground(spec: &ProcessSpec) -> Result<ChildProcess> {
    debug!(
        "spawning foreground process: {} {:?}",
        spec.program, spec.args
    );

    let mut command = Command::new(&spec.program);
    command.args(&spec.args);
    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());
    command.kill_on_drop(true);

    finish_spawn(command, spec)
}

fn finish_spawn(mut command: Command, spec: &ProcessSpec) -> Result<ChildProcess> {
    let child = command.spawn().map_err(|e| {
        error!("failed to spawn process '{}': {}", spec.program, e);
        CoreError::LaunchFailure(format!("failed to spawn '{}': {e}", spec.program))
    })?;

    // tokio::process::Child::id() returns None once the child has been
    // polled to completion; right after spawn it is always present
    let raw_pid = child
        .id()
        .ok_or_else(|| CoreError::LaunchFailure("spawned child did not report a pid".to_string()))?;
    let pid = Pid::from_raw(raw_pid as i32);
    debug!("spawned process {} ({})", pid, spec.program);

    Ok(ChildProcess { pid, child })
}

/// Send SIGTERM to the process group for graceful termination
///
/// `ESRCH` (no such process) and `EPERM` mean the group has already exited
/// and are treated as success; any other error is a teardown failure.
pub fn signal_term_group(child: &ChildProcess) -> Result<()> {
    debug!("sending SIGTERM to process group {}", child.pid);

    match killpg(child.pid, Signal::SIGTERM) {
        Ok(()) => {
            debug!("sent SIGTERM to process group {}", child.pid);
            Ok(())
        }
        Err(nix::errno::Errno::ESRCH) => {
            debug!("process group {} already exited", child.pid);
            Ok(())
        }
        Err(nix::errno::Errno::EPERM) => {
            debug!(
                "permission denied signaling process group {} (likely already exited)",
                child.pid
            );
            Ok(())
        }
        Err(e) => {
            error!("failed to send SIGTERM to process group {}: {}", child.pid, e);
            Err(CoreError::TeardownFailed(format!(
                "failed to send SIGTERM to process group {}: {e}",
                child.pid
            )))
        }
    }
}
