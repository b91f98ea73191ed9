/// Default configuration constants for the complexity analyzer

// Server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

// Cache defaults
pub const DEFAULT_CACHE_CAPACITY: usize = 256;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600; // 1 hour
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300; // 5 minutes

// External image host defaults
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_RECOVERY_TIMEOUT_SECS: u64 = 60;

// Credential environment variables understood by the loader
pub const CLOUD_NAME_ENV: &str = "CLOUDINARY_CLOUD_NAME";
pub const UPLOAD_PRESET_ENV: &str = "CLOUDINARY_UPLOAD_PRESET";

// Prefix for layered environment overrides, e.g. ANALYZER_CACHE__CAPACITY
pub const ENV_PREFIX: &str = "ANALYZER";

// Chart defaults
pub const DEFAULT_CHART_WIDTH: u32 = 1000;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;

// Config file location under the platform config dir
pub const CONFIG_DIR_NAME: &str = "complexity-analyzer";
pub const CONFIG_FILENAME: &str = "config.toml";
