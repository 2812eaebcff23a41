use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable overriding `endpoints.analytics_url`
pub const ANALYTICS_URL_ENV: &str = "WEATHERLENS_ANALYTICS_URL";
/// Environment variable overriding `endpoints.data_url`
pub const DATA_URL_ENV: &str = "WEATHERLENS_DATA_URL";

const DEFAULT_ANALYTICS_URL: &str = "http://localhost:8004/api";
const DEFAULT_DATA_URL: &str = "http://localhost:8000";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend service locations
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// HTTP client behaviour
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Clustering and prediction service (centroids, forecasts, spider data)
    #[serde(default = "default_analytics_url")]
    pub analytics_url: String,

    /// Aggregation service (filters, correlation, seasonal decomposition, charts)
    #[serde(default = "default_data_url")]
    pub data_url: String,
}

fn default_analytics_url() -> String {
    DEFAULT_ANALYTICS_URL.to_string()
}

fn default_data_url() -> String {
    DEFAULT_DATA_URL.to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            analytics_url: default_analytics_url(),
            data_url: default_data_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry: RetrySettings::default(),
        }
    }
}

/// Backoff settings for idempotent GET requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Replace endpoint URLs with values from `lookup` when present and non-empty.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ANALYTICS_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Analytics URL overridden from {}", ANALYTICS_URL_ENV);
            self.endpoints.analytics_url = url;
        }
        if let Some(url) = lookup(DATA_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Data URL overridden from {}", DATA_URL_ENV);
            self.endpoints.data_url = url;
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(
            &self.endpoints.analytics_url,
            "endpoints.analytics_url",
            &mut result,
        );
        validate_url(&self.endpoints.data_url, "endpoints.data_url", &mut result);

        if self.client.timeout_secs == 0 {
            result.add_error("client.timeout_secs", "Timeout must be greater than 0");
        } else if self.client.timeout_secs > 600 {
            result.add_warning(
                "client.timeout_secs",
                "Timeout is unusually long (>10 minutes)",
            );
        }

        let retry = &self.client.retry;
        if retry.max_retries > 10 {
            result.add_warning("client.retry.max_retries", "More than 10 retries configured");
        }
        if retry.initial_delay_ms > retry.max_delay_ms {
            result.add_error(
                "client.retry.initial_delay_ms",
                "Initial delay cannot exceed max delay",
            );
        }

        result
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("weatherlens");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }

            if url.query().is_some() {
                result.add_warning(field_name, "Query string will be ignored");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
