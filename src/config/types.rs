//! Configuration model for a probe run.
//!
//! The whole tree is deserialized from YAML with per-field defaults, so a
//! minimal file only needs a `url` key. Duration fields accept human-friendly
//! strings such as `500ms`, `3s` or `1m30s`.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration errors, fatal at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config read error: {0}")]
    Read(String),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Read(error.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        ConfigError::Parse(error.to_string())
    }
}

/// Immutable settings for one probe run
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProbeConfig {
    /// Target URL, required and non-empty
    #[serde(default)]
    pub url: String,
    /// Delay between scheduled probes
    #[serde(default = "default_interval", deserialize_with = "duration_str::deserialize")]
    pub interval: Duration,
    #[serde(default)]
    pub timeout: TimeoutConfig,
    #[serde(default)]
    pub follow_redirects: RedirectConfig,
    #[serde(default)]
    pub asserts: AssertionRules,
    /// Inline cookies, applied after any cookie-file entries
    #[serde(default)]
    pub cookies: Vec<CookieEntry>,
    /// Netscape-format cookie file
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,
    #[serde(default)]
    pub log: Option<LogConfig>,
    #[serde(default)]
    pub hooks: HooksConfig,
    /// Captured once when the configuration is built; feeds the
    /// `{{run-start}}` token of the log path template
    #[serde(skip, default = "Local::now")]
    pub started_at: DateTime<Local>,
}

impl ProbeConfig {
    /// Single deadline covering the whole request lifecycle of one probe,
    /// connect and read phases combined. Saturates rather than overflowing;
    /// the loader rejects overflowing pairs up front.
    pub fn combined_timeout(&self) -> Duration {
        self.timeout.connect.saturating_add(self.timeout.read)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            interval: default_interval(),
            timeout: TimeoutConfig::default(),
            follow_redirects: RedirectConfig::default(),
            asserts: AssertionRules::default(),
            cookies: Vec::new(),
            cookie_file: None,
            log: None,
            hooks: HooksConfig::default(),
            started_at: Local::now(),
        }
    }
}

/// Connect and read deadlines for a single probe
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_timeout", deserialize_with = "duration_str::deserialize")]
    pub connect: Duration,
    #[serde(default = "default_read_timeout", deserialize_with = "duration_str::deserialize")]
    pub read: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: default_connect_timeout(),
            read: default_read_timeout(),
        }
    }
}

/// Redirect-following policy settings
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RedirectConfig {
    #[serde(default = "default_redirects_enabled")]
    pub enabled: bool,
    /// Hop budget; a chain longer than this is reported as a redirect loop
    #[serde(default = "default_max_redirects")]
    pub max_count: u32,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            enabled: default_redirects_enabled(),
            max_count: default_max_redirects(),
        }
    }
}

/// Response validation rules; unset axes are vacuously satisfied
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct AssertionRules {
    #[serde(default)]
    pub status_code: StatusCodeRules,
    #[serde(default)]
    pub body: BodyRules,
}

/// Status-code assertion axis
#[derive(Debug, Clone, serde::Deserialize)]
pub struct StatusCodeRules {
    /// Acceptable status codes. Absent means {200}; an explicit empty list
    /// disables the axis.
    #[serde(default = "default_status_values")]
    pub values: Vec<u16>,
    /// Pattern matched against the decimal form of the status code
    #[serde(default)]
    pub regex: Option<String>,
}

impl Default for StatusCodeRules {
    fn default() -> Self {
        Self {
            values: default_status_values(),
            regex: None,
        }
    }
}

/// Body assertion axis
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct BodyRules {
    /// Pattern matched against the raw body bytes
    #[serde(default)]
    pub regex: Option<String>,
}

/// One preset cookie, scoped to the target URL's origin
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct CookieEntry {
    pub key: String,
    pub value: String,
}

/// Log file destination with path and line templates.
///
/// The path template recognizes `{{run-start}}`; the line template
/// recognizes `{{timestamp}}`, `{{status}}` and `{{duration}}`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LogConfig {
    pub path: String,
    pub format: String,
}

/// Lifecycle hook commands
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct HooksConfig {
    /// Command spawned once at run start, best-effort
    #[serde(default)]
    pub on_start: Option<String>,
}

fn default_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(7)
}

fn default_redirects_enabled() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_status_values() -> Vec<u16> {
    vec![200]
}

mod duration_str {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
