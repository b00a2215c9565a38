//! Health gate: bounded probe retries with cancellation
//!
//! The gate drives a probe up to `retries` times with a fixed inter-attempt
//! delay, turning the sequence of probe outcomes into one pass/fail
//! decision. It observes the run's cancellation token at every probe and
//! every sleep, so a cancelled run stops retrying promptly.

use crate::{CoreError, Result};
use schema::HealthCheckSpec;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{create_probe, Probe};

/// Outcome of a completed gate pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// A probe attempt succeeded
    Healthy,
    /// The run was cancelled before any probe succeeded
    Cancelled,
}

/// Wait until the configured health check passes
///
/// Probes up to `retries` times, sleeping `interval` between consecutive
/// attempts (never after the last). Returns [`GateVerdict::Healthy`] on the
/// first success, [`GateVerdict::Cancelled`] if the token fires first, and
/// [`CoreError::HealthCheckExhausted`] once every attempt has failed. An
/// unrecognized check kind fails immediately with
/// [`CoreError::UnknownHealthCheckKind`], regardless of remaining retries.
pub async fn wait_healthy(
    check: &HealthCheckSpec,
    cancel: &CancellationToken,
) -> Result<GateVerdict> {
    let probe = create_probe(check)?;
    debug!(kind = %check.kind, port = check.port, "waiting for health check");
    drive(probe.as_ref(), check.retries, check.interval(), cancel).await
}

/// Retry loop shared by [`wait_healthy`] and the gate tests
async fn drive(
    probe: &(dyn Probe + Send + Sync),
    retries: u32,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<GateVerdict> {
    for attempt in 0..retries {
        let outcome = tokio::select! {
            outcome = probe.check() => outcome,
            _ = cancel.cancelled() => {
                debug!("health gate cancelled during probe");
                return Ok(GateVerdict::Cancelled);
            }
        };

        match outcome {
            Ok(()) => {
                debug!(attempt, "health check passed");
                return Ok(GateVerdict::Healthy);
            }
            Err(err) => {
                warn!(attempt, error = %err, "health check failed");
            }
        }

        // No sleep after the final attempt
        if attempt + 1 < retries {
            tokio::select! {
                _ = sleep(interval) => {}
                _ = cancel.cancelled() => {
                    debug!("health gate cancelled during retry delay");
                    return Ok(GateVerdict::Cancelled);
                }
            }
        }
    }

    Err(CoreError::HealthCheckExhausted { attempts: retries })
}
