//! Configuration module for Mayday.
//!
//! Typed configuration structs mapping to the YAML configuration file, with
//! loading, validation and defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Collector endpoint used by [`CollectorConfig::hosted`].
pub const DEFAULT_COLLECTOR_URL: &str = "https://collector.mayday.dev/api/v1/reports";

/// Multipart field name under which report files are uploaded.
pub const DEFAULT_ATTACHMENT_KEY: &str = "reports[]";

/// Header carrying the organization token for the hosted collector.
pub const TOKEN_HEADER: &str = "X-Mayday-Token";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Mayday.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collector: CollectorConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// HTTP method used to reach the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// True for methods that carry a request body.
    pub fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collector endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Endpoint receiving the report batches.
    pub url: String,
    pub method: HttpMethod,
    /// Extra request headers, sent verbatim.
    pub headers: BTreeMap<String, String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Multipart field name for report files.
    pub attachment_key: String,
}

impl CollectorConfig {
    /// Endpoint settings for the hosted collector, authenticated by `token`.
    pub fn hosted(token: &str, bundle_name: &str, bundle_id: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(TOKEN_HEADER.to_string(), token.to_string());
        headers.insert("X-Bundle-Name".to_string(), bundle_name.to_string());
        headers.insert("X-Bundle-Id".to_string(), bundle_id.to_string());
        headers.insert(
            "User-Agent".to_string(),
            format!("mayday/{}", env!("CARGO_PKG_VERSION")),
        );
        Self {
            headers,
            ..Self::default()
        }
    }
}

/// Report store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Bundle identifier the crash monitor prefixes report files with.
    pub bundle_id: String,
    /// Directory holding the monitor's `Reports/` folder.
    pub base_path: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/mayday/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mayday")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_COLLECTOR_URL.to_string(),
            method: HttpMethod::Post,
            headers: BTreeMap::new(),
            timeout_secs: 15,
            attachment_key: DEFAULT_ATTACHMENT_KEY.to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bundle_id: "app".to_string(),
            base_path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("mayday"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"collector.url"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ValidationError {
                field: field.into(),
                message: message.into(),
            });
        };

        // --- collector ---
        if !(self.collector.url.starts_with("http://")
            || self.collector.url.starts_with("https://"))
        {
            push("collector.url", "must be an http or https URL");
        }
        if self.collector.timeout_secs == 0 {
            push("collector.timeout_secs", "must be greater than 0");
        }
        if self.collector.attachment_key.is_empty() {
            push("collector.attachment_key", "must not be empty");
        }

        // --- store ---
        if self.store.bundle_id.is_empty() {
            push("store.bundle_id", "must not be empty");
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            push(
                "logging.level",
                "must be one of trace, debug, info, warn, error",
            );
        }

        errors
    }
}
