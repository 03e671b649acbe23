//! Configuration structures.
//!
//! Configuration is loaded from a JSON file or from environment variables.
//! Every section defaults, so an empty document is a valid configuration.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_WORK_DIR: &str = "JEEVES_TOOLS_WORK_DIR";
pub const ENV_YOLO: &str = "JEEVES_TOOLS_YOLO";
pub const ENV_AUTO_APPROVE: &str = "JEEVES_TOOLS_AUTO_APPROVE";
pub const ENV_SEARCH_URL: &str = "JEEVES_TOOLS_SEARCH_URL";
pub const ENV_SEARCH_KEY: &str = "JEEVES_TOOLS_SEARCH_KEY";
pub const ENV_FETCH_URL: &str = "JEEVES_TOOLS_FETCH_URL";
pub const ENV_FETCH_KEY: &str = "JEEVES_TOOLS_FETCH_KEY";

/// Top-level tools configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Approval policy and working directory.
    #[serde(default)]
    pub context: ContextConfig,

    /// Search / fetch service configuration.
    #[serde(default)]
    pub web: WebConfig,

    /// Output and execution limits.
    #[serde(default)]
    pub limits: ToolLimits,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Approval policy and working directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContextConfig {
    /// Root for relative file and shell operations. Defaults to the process cwd.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Bypass every approval check.
    #[serde(default)]
    pub yolo_mode: bool,

    /// Action labels approved without consulting the callback.
    #[serde(default)]
    pub auto_approved_actions: Vec<String>,
}

/// Configuration of one remote web service (search or fetch).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebServiceConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default)]
    pub custom_headers: HashMap<String, String>,
}

impl WebServiceConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            custom_headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }
}

// Keeps the credential out of logs.
impl std::fmt::Debug for WebServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServiceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("custom_headers", &self.custom_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Web tools configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default)]
    pub search: Option<WebServiceConfig>,

    #[serde(default)]
    pub fetch: Option<WebServiceConfig>,

    /// Per-request timeout for the search and fetch services.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("jeeves-tools/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            search: None,
            fetch: None,
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output and execution limits applied by the backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolLimits {
    /// Maximum characters handed back to the agent per call.
    pub max_output_chars: usize,

    /// Maximum characters per output line.
    pub max_line_length: usize,

    /// Default and maximum number of lines `read_file` returns.
    pub max_read_lines: usize,

    /// Bytes of content after which `read_file` stops reading.
    pub max_read_bytes: usize,

    /// Files larger than this are skipped by `grep`.
    pub max_grep_file_bytes: u64,

    /// Maximum paths `glob_tool` returns.
    pub max_glob_matches: usize,

    /// Largest file `read_media_file` will encode.
    pub max_media_bytes: u64,

    /// Shell timeout when the caller does not pass one.
    #[serde(with = "humantime_serde")]
    pub shell_timeout: Duration,

    /// Upper bound on caller-requested shell timeouts.
    #[serde(with = "humantime_serde")]
    pub max_shell_timeout: Duration,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self {
            max_output_chars: 50_000,
            max_line_length: 2_000,
            max_read_lines: 1_000,
            max_read_bytes: 100 * 1024,
            max_grep_file_bytes: 10 * 1024 * 1024,
            max_glob_matches: 1_000,
            max_media_bytes: 10 * 1024 * 1024,
            shell_timeout: Duration::from_secs(60),
            max_shell_timeout: Duration::from_secs(300),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Load configuration from `JEEVES_TOOLS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.apply_lookup(lookup)?;
        Ok(config)
    }

    /// Overlay environment-style variables on top of this configuration.
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_WORK_DIR).filter(|v| !v.is_empty()) {
            self.context.work_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_YOLO) {
            self.context.yolo_mode = parse_bool(ENV_YOLO, &raw)?;
        }
        if let Some(raw) = lookup(ENV_AUTO_APPROVE) {
            self.context.auto_approved_actions.extend(
                raw.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(service) = service_from_lookup(&lookup, ENV_SEARCH_URL, ENV_SEARCH_KEY)? {
            self.web.search = Some(service);
        }
        if let Some(service) = service_from_lookup(&lookup, ENV_FETCH_URL, ENV_FETCH_KEY)? {
            self.web.fetch = Some(service);
        }
        Ok(())
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::config(format!("{key}: expected a boolean, got '{other}'"))),
    }
}

fn service_from_lookup<F>(lookup: &F, url_key: &str, key_key: &str) -> Result<Option<WebServiceConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    match (lookup(url_key), lookup(key_key)) {
        (None, None) => Ok(None),
        (Some(url), Some(key)) => Ok(Some(WebServiceConfig::new(url, key))),
        (Some(_), None) => Err(Error::config(format!("{url_key} is set but {key_key} is missing"))),
        (None, Some(_)) => Err(Error::config(format!("{key_key} is set but {url_key} is missing"))),
    }
}
