//! HTTP request health probing

use async_trait::async_trait;
use hyper::{Body, Client, Method, Request, Uri};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use super::{HealthError, Probe};

/// HTTP health probe that makes a GET request and inspects the status code
///
/// Any response with a status code below 300 counts as healthy; a status of
/// 300 or above, a connection failure, or a timeout is a probe failure.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// URL to request
    url: String,
    /// Request timeout
    timeout: Duration,
}

impl HttpProbe {
    /// Create a new HTTP probe
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to make a GET request to
    /// * `timeout` - Maximum time to wait for the request to complete
    pub fn new(url: String, timeout: Duration) -> Self {
        Self { url, timeout }
    }

    /// Get the target URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self) -> Result<(), HealthError> {
        debug!("HTTP probe requesting {}", self.url);

        let client = Client::new();

        let uri: Uri = self.url.parse()?;
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())?;

        let response = match timeout(self.timeout, client.request(req)).await {
            Ok(Ok(response)) => response,
            Ok(Err(hyper_error)) => {
                debug!("HTTP probe to {} failed: {}", self.url, hyper_error);
                return Err(HealthError::Http(hyper_error));
            }
            Err(_elapsed) => {
                debug!(
                    "HTTP probe to {} timed out after {:?}",
                    self.url, self.timeout
                );
                return Err(HealthError::Timeout(self.timeout));
            }
        };

        let status = response.status();
        debug!("HTTP probe to {} returned status {}", self.url, status);

        if status.as_u16() >= 300 {
            return Err(HealthError::UnexpectedStatus(status.as_u16()));
        }

        Ok(())
    }
}
