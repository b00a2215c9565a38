//! Health checking and gating functionality
//!
//! This module provides the HTTP and TCP reachability probes used to decide
//! when a pre-exec command is ready, and the gate that drives bounded probe
//! retries into a single pass/fail decision.
//!
//! ## Types
//!
//! - [`Probe`]: the trait a single reachability check implements
//! - [`HttpProbe`]: HTTP GET based checking, healthy below status 300
//! - [`TcpProbe`]: TCP connection based checking
//! - [`HealthError`]: probe-level failure reasons
//! - [`gate`]: the retry loop turning probe outcomes into one decision

pub mod error;
pub mod gate;
pub mod http;
pub mod tcp;
pub mod types;

pub use error::HealthError;
pub use gate::{wait_healthy, GateVerdict};
pub use http::HttpProbe;
pub use tcp::TcpProbe;
pub use types::Probe;

use crate::{CoreError, Result};
use schema::{HealthCheckKind, HealthCheckSpec};

/// Create a probe from a health check specification
///
/// Translates the configured kind into a concrete probe implementation,
/// applying the check's per-probe timeout. A kind this build does not
/// recognize is rejected here, before any probe attempt is made.
pub fn create_probe(check: &HealthCheckSpec) -> Result<Box<dyn Probe + Send + Sync>> {
    match &check.kind {
        HealthCheckKind::Http => {
            let url = format!("http://localhost:{}{}", check.port, check.path);
            Ok(Box::new(HttpProbe::new(url, check.timeout())))
        }
        HealthCheckKind::Tcp => Ok(Box::new(TcpProbe::new(
            "localhost",
            check.port,
            check.timeout(),
        ))),
        HealthCheckKind::Other(kind) => Err(CoreError::UnknownHealthCheckKind(kind.clone())),
    }
}
