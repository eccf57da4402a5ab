//! Client configuration from defaults, environment variables and files.

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix shared by every client setting.
pub const ENV_PREFIX: &str = "ROULETTE";

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the definitions service
    pub base_url: String,

    /// Delay between background refreshes
    pub poll_interval: Duration,

    /// Timeout of a single definitions request
    pub request_timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            poll_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("roulette-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// File and environment representation; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    base_url: Option<String>,
    poll_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Load from `ROULETTE_*` environment variables over the defaults.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup using the environment variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));
        let secs = |name: &str| -> Result<Option<u64>, ConfigError> {
            var(name)
                .map(|raw| {
                    raw.trim().parse::<u64>().map_err(|e| {
                        ConfigError::Parse(format!("{}_{}: {}", ENV_PREFIX, name, e))
                    })
                })
                .transpose()
        };

        let partial = PartialConfig {
            base_url: var("BASE_URL"),
            poll_interval_secs: secs("POLL_INTERVAL_SECS")?,
            request_timeout_secs: secs("REQUEST_TIMEOUT_SECS")?,
            user_agent: var("USER_AGENT"),
        };

        let config = Self::default().merge(partial);
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file over the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::Load("No file extension found".to_string()))?;
        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))?;

        let content = fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse configuration text in the given format.
    pub fn parse(content: &str, format: FileFormat) -> Result<Self, ConfigError> {
        let partial: PartialConfig = match format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("JSON parse error: {}", e)))?,
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e)))?,
        };

        let config = Self::default().merge(partial);
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("base_url must not be empty".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Validation(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Endpoint of the feature listing RPC.
    pub fn list_features_url(&self) -> String {
        format!(
            "{}/rpc/roulette.v1.RouletteService/ListFeatures",
            self.base_url.trim_end_matches('/')
        )
    }

    fn merge(mut self, partial: PartialConfig) -> Self {
        if let Some(base_url) = partial.base_url {
            self.base_url = base_url;
        }
        if let Some(secs) = partial.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = partial.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = partial.user_agent {
            self.user_agent = user_agent;
        }
        self
    }
}
