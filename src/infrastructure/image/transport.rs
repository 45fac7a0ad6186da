//! Transports that turn a URI into raw bytes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::errors::{CacheResult, ImageError};
use crate::domain::ports::TransportPort;

use super::generator::{CoverGenerator, parse_generated_uri};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches resources over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the given timeout and optional user agent.
    ///
    /// # Errors
    /// Returns [`ImageError::Config`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> CacheResult<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder
            .build()
            .map_err(|e| ImageError::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TransportPort for HttpTransport {
    async fn fetch(&self, uri: &str) -> CacheResult<Bytes> {
        debug!(uri = %uri, "Downloading resource");

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| ImageError::fetch(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ImageError::fetch(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| ImageError::fetch(format!("Failed to read body: {e}")))
    }
}

/// Sends generated-cover URIs to the placeholder generator and everything
/// else to the network transport.
pub struct RoutingTransport {
    generator: Arc<CoverGenerator>,
    network: Arc<dyn TransportPort>,
}

impl RoutingTransport {
    /// Creates a routing transport.
    #[must_use]
    pub fn new(generator: Arc<CoverGenerator>, network: Arc<dyn TransportPort>) -> Self {
        Self { generator, network }
    }
}

impl std::fmt::Debug for RoutingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingTransport")
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TransportPort for RoutingTransport {
    async fn fetch(&self, uri: &str) -> CacheResult<Bytes> {
        let Some((title, author)) = parse_generated_uri(uri) else {
            return self.network.fetch(uri).await;
        };

        debug!(title = %title, author = %author, "Rendering placeholder cover");
        let generator = self.generator.clone();
        tokio::task::spawn_blocking(move || generator.render_png(&title, &author))
            .await
            .map_err(|e| ImageError::fetch(format!("Placeholder task failed: {e}")))?
    }
}
