//! Core trait for health checking

use super::HealthError;
use async_trait::async_trait;

/// Trait for a single reachability check
///
/// Implemented by the concrete probe types (HTTP, TCP) to give the gate a
/// uniform interface. One call performs one probe attempt.
#[async_trait]
pub trait Probe {
    /// Execute the check once
    ///
    /// Returns `Ok(())` if the target is reachable, or an error describing
    /// why it is not. Implementations must respect their configured timeout.
    async fn check(&self) -> Result<(), HealthError>;
}
