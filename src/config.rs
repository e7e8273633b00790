use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the roastery console
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoasteryConfig {
    /// Backend REST API settings
    pub api: ApiConfig,
    /// Read-through query cache settings
    pub cache: CacheConfig,
    /// Where the signed-in session is kept
    pub session: SessionConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// List paging defaults
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Client-side request throttling
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// JSON file holding the bearer token and operator role
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Default filter when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PaginationConfig {
    pub default_limit: u32,
}

impl Default for RoasteryConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/api/v1/".to_string(),
                timeout_seconds: 30,
                rate_limit: RateLimitConfig {
                    requests_per_second: 10,
                    burst_capacity: 20,
                },
            },
            cache: CacheConfig {
                ttl_seconds: 300, // 5 minutes
                max_capacity: 1000,
            },
            session: SessionConfig {
                file_path: ".roastery/session.json".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json_logs: false,
            },
            pagination: PaginationConfig { default_limit: 10 },
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl RoasteryConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (roastery.toml, .roastery-rc)
    /// 3. Environment variables (ROASTERY_API__BASE_URL and friends)
    pub fn load() -> Result<Self> {
        Self::build(None)
    }

    /// Same layering as [`load`](Self::load) with an explicit file in place
    /// of the default file names.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if Path::new("roastery.toml").exists() {
                    builder = builder.add_source(File::with_name("roastery"));
                }
                if Path::new(".roastery-rc").exists() {
                    builder = builder.add_source(
                        File::with_name(".roastery-rc").format(config::FileFormat::Toml),
                    );
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ROASTERY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration sources")?;
        let roastery_config: RoasteryConfig = config
            .try_deserialize()
            .context("Configuration has invalid values")?;

        Ok(roastery_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<RoasteryConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = RoasteryConfig::load_env_file();
        RoasteryConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static RoasteryConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e:#}"))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
