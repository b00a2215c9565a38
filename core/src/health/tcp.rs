//! TCP connection health probing

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{HealthError, Probe};

/// TCP health probe that tests connection establishment
///
/// The probe attempts to establish a TCP connection to the specified host
/// and port; the connection is closed immediately after establishment.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    /// Target host to connect to
    host: String,
    /// Target port to connect to
    port: u16,
    /// Connection timeout
    timeout: Duration,
}

impl TcpProbe {
    /// Create a new TCP probe
    ///
    /// # Arguments
    ///
    /// * `host` - The host to connect to (e.g., "localhost")
    /// * `port` - The port to connect to
    /// * `timeout` - Maximum time to wait for connection establishment
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Get the target address as a string
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn check(&self) -> Result<(), HealthError> {
        let address = self.address();
        debug!("TCP probe connecting to {}", address);

        match timeout(self.timeout, TcpStream::connect(&address)).await {
            Ok(Ok(_stream)) => {
                debug!("TCP probe to {} succeeded", address);
                Ok(())
            }
            Ok(Err(io_error)) => {
                debug!("TCP probe to {} failed: {}", address, io_error);
                Err(HealthError::Tcp(io_error))
            }
            Err(_elapsed) => {
                debug!(
                    "TCP probe to {} timed out after {:?}",
                    address, self.timeout
                );
                Err(HealthError::Timeout(self.timeout))
            }
        }
    }
}
