pub mod defaults;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use self::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for locally served graph paths, e.g. `https://bench.example.com`.
    pub public_base_url: Option<String>,
    pub cache: CacheConfig,
    pub publisher: PublisherConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: Option<u64>,
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub enabled: bool,
    pub cloud_name: Option<String>,
    pub upload_preset: Option<String>,
    pub upload_base_url: String,
    pub timeout_secs: u64,
    pub failure_threshold: u32,
    pub recovery_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// TTF used instead of the bundled DejaVu Sans.
    pub font_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
    }

    /// Load configuration from defaults, an optional TOML file and the environment.
    ///
    /// An explicitly given file must exist. Without one, the platform config
    /// location is used when present.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match config_path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::default_config_path().filter(|p| p.exists()) {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: ServerConfig = builder
            .build()
            .context("Failed to assemble configuration sources")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config.apply_credentials(
            std::env::var(CLOUD_NAME_ENV).ok(),
            std::env::var(UPLOAD_PRESET_ENV).ok(),
        );

        Ok(config)
    }

    /// Fill image-host credentials; the publisher turns on once both are known.
    pub fn apply_credentials(&mut self, cloud_name: Option<String>, upload_preset: Option<String>) {
        if let Some(name) = cloud_name.filter(|s| !s.trim().is_empty()) {
            self.publisher.cloud_name = Some(name);
        }
        if let Some(preset) = upload_preset.filter(|s| !s.trim().is_empty()) {
            self.publisher.upload_preset = Some(preset);
        }
        if self.publisher.has_credentials() {
            self.publisher.enabled = true;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow::anyhow!("Port must be greater than 0"));
        }

        if self.cache.capacity == 0 {
            return Err(anyhow::anyhow!("Cache capacity must be greater than 0"));
        }

        if self.cache.cleanup_interval_secs == 0 {
            return Err(anyhow::anyhow!("Cache cleanup interval must be greater than 0"));
        }

        if self.publisher.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Upload timeout must be greater than 0"));
        }

        if self.publisher.enabled && !self.publisher.has_credentials() {
            return Err(anyhow::anyhow!(
                "Publisher is enabled but cloud_name or upload_preset is missing"
            ));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(anyhow::anyhow!("Chart dimensions must be greater than 0"));
        }

        Ok(())
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl PublisherConfig {
    pub fn has_credentials(&self) -> bool {
        self.cloud_name.is_some() && self.upload_preset.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_secs(self.recovery_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            public_base_url: None,
            cache: CacheConfig::default(),
            publisher: PublisherConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl_secs: Some(DEFAULT_CACHE_TTL_SECS),
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cloud_name: None,
            upload_preset: None,
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
            timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_timeout_secs: DEFAULT_RECOVERY_TIMEOUT_SECS,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
            font_path: None,
        }
    }
}
