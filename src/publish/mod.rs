pub mod cloudinary;

pub use cloudinary::CloudinaryUploader;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::stability::{BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitState};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image host returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Image host response did not contain a URL")]
    MissingUrl,

    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upload circuit '{0}' is open")]
    CircuitOpen(String),

    #[error("No image host configured")]
    NotConfigured,
}

impl From<BreakerError<PublishError>> for PublishError {
    fn from(err: BreakerError<PublishError>) -> Self {
        match err {
            BreakerError::Open(name) => PublishError::CircuitOpen(name),
            BreakerError::Timeout(after) => PublishError::Timeout(after),
            BreakerError::Inner(e) => e,
        }
    }
}

/// An external host that can store a chart and hand back its public URL.
#[async_trait]
pub trait ImagePublisher: Send + Sync {
    fn name(&self) -> &str;

    async fn upload(&self, id: &str, png: &[u8]) -> Result<String, PublishError>;
}

/// Where a chart ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { url: String },
    LocalFallback { path: String, reason: String },
}

impl PublishOutcome {
    /// The address a client should use to fetch the chart.
    pub fn graph_reference(&self) -> &str {
        match self {
            PublishOutcome::Published { url } => url,
            PublishOutcome::LocalFallback { path, .. } => path,
        }
    }

    pub fn into_graph_reference(self) -> String {
        match self {
            PublishOutcome::Published { url } => url,
            PublishOutcome::LocalFallback { path, .. } => path,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublisherStatus {
    pub enabled: bool,
    pub host: Option<String>,
    pub circuit: CircuitState,
}

/// Tries the external host and falls back to the local download path.
///
/// Upload failures never escape: they are logged here and reported as
/// [`PublishOutcome::LocalFallback`].
pub struct GraphPublisher {
    uploader: Option<Arc<dyn ImagePublisher>>,
    breaker: CircuitBreaker,
    local_base: String,
}

impl GraphPublisher {
    pub fn new(
        uploader: Option<Arc<dyn ImagePublisher>>,
        breaker_config: CircuitBreakerConfig,
        public_base_url: Option<&str>,
    ) -> Self {
        Self {
            uploader,
            breaker: CircuitBreaker::new("image-upload", breaker_config),
            local_base: public_base_url
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_default(),
        }
    }

    /// Publisher that always serves charts locally.
    pub fn local_only(public_base_url: Option<&str>) -> Self {
        Self::new(None, CircuitBreakerConfig::default(), public_base_url)
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let publisher = &config.publisher;
        let breaker_config = CircuitBreakerConfig {
            failure_threshold: publisher.failure_threshold.max(1),
            recovery_timeout: publisher.recovery_timeout(),
            timeout: publisher.timeout(),
        };

        let uploader: Option<Arc<dyn ImagePublisher>> = if publisher.enabled {
            match CloudinaryUploader::new(publisher) {
                Ok(uploader) => Some(Arc::new(uploader)),
                Err(e) => {
                    warn!("Image host disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self::new(uploader, breaker_config, config.public_base_url.as_deref())
    }

    pub fn local_path(&self, id: &str) -> String {
        format!("{}/download/{}", self.local_base, id)
    }

    pub fn status(&self) -> PublisherStatus {
        PublisherStatus {
            enabled: self.uploader.is_some(),
            host: self.uploader.as_ref().map(|u| u.name().to_string()),
            circuit: self.breaker.state(),
        }
    }

    pub async fn publish(&self, id: &str, png: &[u8]) -> PublishOutcome {
        match self.try_upload(id, png).await {
            Ok(url) => {
                info!("Published chart {} to {}", id, url);
                PublishOutcome::Published { url }
            }
            Err(PublishError::NotConfigured) => PublishOutcome::LocalFallback {
                path: self.local_path(id),
                reason: PublishError::NotConfigured.to_string(),
            },
            Err(e) => {
                warn!("Chart upload failed for {}, serving locally: {}", id, e);
                PublishOutcome::LocalFallback {
                    path: self.local_path(id),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_upload(&self, id: &str, png: &[u8]) -> Result<String, PublishError> {
        let uploader = self.uploader.as_ref().ok_or(PublishError::NotConfigured)?;
        Ok(self.breaker.call(uploader.upload(id, png)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticHost {
        url: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImagePublisher for StaticHost {
        fn name(&self) -> &str {
            "static"
        }

        async fn upload(&self, id: &str, _png: &[u8]) -> Result<String, PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.url {
                Some(url) => Ok(format!("{}/{}.png", url, id)),
                None => Err(PublishError::Status {
                    status: 500,
                    body: "down".to_string(),
                }),
            }
        }
    }

    fn host(url: Option<&str>) -> Arc<StaticHost> {
        Arc::new(StaticHost {
            url: url.map(str::to_string),
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_local_only_falls_back() {
        let publisher = GraphPublisher::local_only(None);
        let outcome = publisher.publish("abc", b"png").await;

        assert!(!outcome.is_published());
        assert_eq!(outcome.graph_reference(), "/download/abc");
        assert!(!publisher.status().enabled);
    }

    #[tokio::test]
    async fn test_public_base_url_prefixes_fallback() {
        let publisher = GraphPublisher::local_only(Some("https://bench.example.com/"));
        assert_eq!(publisher.local_path("abc"), "https://bench.example.com/download/abc");
    }

    #[tokio::test]
    async fn test_successful_upload_uses_external_url() {
        let host = host(Some("https://cdn.example.com"));
        let publisher = GraphPublisher::new(Some(host.clone() as Arc<dyn ImagePublisher>), CircuitBreakerConfig::default(), None);

        let outcome = publisher.publish("abc", b"png").await;
        assert_eq!(
            outcome,
            PublishOutcome::Published {
                url: "https://cdn.example.com/abc.png".to_string()
            }
        );
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_falls_back_and_trips_circuit() {
        let host = host(None);
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            ..CircuitBreakerConfig::default()
        };
        let publisher = GraphPublisher::new(Some(host.clone() as Arc<dyn ImagePublisher>), config, None);

        for id in ["a", "b", "c"] {
            let outcome = publisher.publish(id, b"png").await;
            assert_eq!(outcome.graph_reference(), format!("/download/{}", id));
        }

        // third call is short-circuited
        assert_eq!(host.calls.load(Ordering::SeqCst), 2);
        assert_eq!(publisher.status().circuit, CircuitState::Open);
    }
}
