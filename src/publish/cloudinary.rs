use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ImagePublisher, PublishError};
use crate::config::PublisherConfig;

/// Upload endpoint response; only the URLs are used.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

/// Unsigned uploads to a Cloudinary-compatible image host.
#[derive(Debug, Clone)]
pub struct CloudinaryUploader {
    client: Client,
    endpoint: String,
    upload_preset: String,
}

impl CloudinaryUploader {
    pub fn new(config: &PublisherConfig) -> Result<Self, PublishError> {
        let (Some(cloud_name), Some(upload_preset)) =
            (config.cloud_name.as_deref(), config.upload_preset.as_deref())
        else {
            return Err(PublishError::NotConfigured);
        };

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/{}/image/upload",
                config.upload_base_url.trim_end_matches('/'),
                cloud_name
            ),
            upload_preset: upload_preset.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImagePublisher for CloudinaryUploader {
    fn name(&self) -> &str {
        "cloudinary"
    }

    async fn upload(&self, id: &str, png: &[u8]) -> Result<String, PublishError> {
        let file = Part::bytes(png.to_vec())
            .file_name(format!("{}.png", id))
            .mime_str("image/png")?;
        let form = Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("public_id", id.to_string())
            .part("file", file);

        debug!("Uploading {} byte chart to {}", png.len(), self.endpoint);
        let response = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: UploadResponse = response.json().await?;
        body.secure_url.or(body.url).ok_or(PublishError::MissingUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> PublisherConfig {
        PublisherConfig {
            enabled: true,
            cloud_name: Some("demo".to_string()),
            upload_preset: Some("charts".to_string()),
            upload_base_url: "https://images.example.com/v1_1/".to_string(),
            ..PublisherConfig::default()
        }
    }

    #[test]
    fn test_endpoint_from_config() {
        let uploader = CloudinaryUploader::new(&configured()).unwrap();
        assert_eq!(uploader.endpoint(), "https://images.example.com/v1_1/demo/image/upload");
        assert_eq!(uploader.name(), "cloudinary");
    }

    #[test]
    fn test_requires_credentials() {
        let mut config = configured();
        config.upload_preset = None;
        assert!(matches!(
            CloudinaryUploader::new(&config),
            Err(PublishError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let mut config = configured();
        config.upload_base_url = "http://127.0.0.1:9".to_string();
        config.timeout_secs = 2;
        let uploader = CloudinaryUploader::new(&config).unwrap();

        let result = uploader.upload("abc", &[0x89, b'P', b'N', b'G']).await;
        assert!(matches!(result, Err(PublishError::Http(_))));
    }
}
