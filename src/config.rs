//! Configuration management for GXA Fetcher
//!
//! Configuration is optional: every field has a default, and a TOML file
//! only needs the values it overrides. Files are looked up in this order:
//!
//! 1. the path given with `--config`
//! 2. the path in `GXA_FETCHER_CONFIG`
//! 3. `./gxa-fetcher.toml`, `./config.toml`
//! 4. `<user config dir>/gxa-fetcher/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::client::config::parse_base_url;
use crate::app::{AtlasEndpoints, ClientConfig};
use crate::constants::{atlas, config as paths, env, http, limits, logging};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Service endpoints
    pub atlas: AtlasConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Request timeout (e.g. "60s", "2m")
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host
    pub pool_max_per_host: usize,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Request pacing (requests per second)
    pub rate_limit_rps: u32,
    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: http::POOL_IDLE_TIMEOUT,
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            tcp_nodelay: true,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            user_agent: None,
        }
    }
}

/// TOML-friendly endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AtlasConfigToml {
    /// Experiment search resource
    pub search_url: String,
    /// Experiment metadata resource
    pub metadata_url: String,
    /// Experiment file archive
    pub files_url: String,
}

impl Default for AtlasConfigToml {
    fn default() -> Self {
        Self {
            search_url: atlas::SEARCH_URL.to_string(),
            metadata_url: atlas::METADATA_URL.to_string(),
            files_url: atlas::FILES_URL.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when no file exists
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if an explicitly named file does not
    /// exist, or a parse error if a file is not valid TOML.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_file_override.or_else(|| {
            std::env::var(env::CONFIG_FILE)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        });

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound { path });
            }
            return Self::load_from_file(&path).await;
        }

        match Self::find_config_file()? {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write a commented default configuration file
    ///
    /// Returns `false` without touching the file when it already exists and
    /// `force` is not set.
    pub async fn write_default(path: &Path, force: bool) -> ConfigResult<bool> {
        if path.exists() && !force {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Wrote default configuration to {}", path.display());
        Ok(true)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> ConfigResult<Option<PathBuf>> {
        let mut search_paths = vec![
            PathBuf::from(format!("./{}", paths::LOCAL_FILE_NAME)),
            PathBuf::from("./config.toml"),
        ];
        if let Ok(user_config) = Self::default_config_path() {
            search_paths.push(user_config);
        }

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(paths::APP_DIR_NAME).join(paths::FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig =
            toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Runtime HTTP client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: self.client.tcp_nodelay,
            pool_idle_timeout: Some(self.client.pool_idle_timeout),
            pool_max_per_host: self.client.pool_max_per_host,
            request_timeout: self.client.request_timeout,
            connect_timeout: self.client.connect_timeout,
            rate_limit_rps: self.client.rate_limit_rps,
            user_agent: self
                .client
                .user_agent
                .clone()
                .unwrap_or_else(|| http::USER_AGENT.to_string()),
        }
    }

    /// Runtime endpoint layout
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first bad URL
    pub fn endpoints(&self) -> ConfigResult<AtlasEndpoints> {
        let parse = |field: &str, value: &str| {
            parse_base_url(value).map_err(|e| ConfigError::InvalidValue {
                field: format!("atlas.{}", field),
                value: value.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(AtlasEndpoints {
            search_url: parse("search_url", &self.atlas.search_url)?,
            metadata_url: parse("metadata_url", &self.atlas.metadata_url)?,
            files_url: parse("files_url", &self.atlas.files_url)?,
        })
    }

    /// Check values that TOML types alone cannot constrain
    pub fn validate(&self) -> ConfigResult<()> {
        if self.client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: "Expected one of error, warn, info, debug, trace".to_string(),
            });
        }

        self.endpoints().map(|_| ())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|e| format!("# failed to render: {}", e))
    }

    /// Generate default configuration content with helpful comments
    fn generate_default_config_content() -> String {
        format!(
            r#"# GXA Fetcher Configuration
# Every setting is optional; remove a line to fall back to its default.

[client]
# Timeouts accept human-readable durations ("30s", "2m")
request_timeout = "60s"
connect_timeout = "30s"
pool_idle_timeout = "90s"
pool_max_per_host = {}
tcp_nodelay = true
# Requests per second sent to EBI services
rate_limit_rps = {}
# user_agent = "my-lab-pipeline/1.0"

[atlas]
# Point these at a mirror or a local server if needed
search_url = "{}"
metadata_url = "{}"
files_url = "{}"

[logging]
# Used when no -v/--very-verbose/-q flag is given
level = "{}"  # error, warn, info, debug, trace
"#,
            http::POOL_MAX_PER_HOST,
            limits::DEFAULT_RATE_LIMIT_RPS,
            atlas::SEARCH_URL,
            atlas::METADATA_URL,
            atlas::FILES_URL,
            logging::DEFAULT_LOG_LEVEL,
        )
    }
}
