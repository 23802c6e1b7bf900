//! Loading and validation of [`ProbeConfig`] values.

use std::path::Path;

use crate::config::cookie_file;
use crate::config::types::{ConfigError, CookieEntry, ProbeConfig};

impl ProbeConfig {
    /// Load a configuration from a YAML file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] when the file cannot be read,
    /// [`ConfigError::Parse`] for malformed YAML and
    /// [`ConfigError::Invalid`] when a required invariant fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml(data: &str) -> Result<Self, ConfigError> {
        let config: ProbeConfig = serde_yaml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration for a bare URL with every other field at its
    /// default, the same defaults the YAML loader applies.
    pub fn for_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Invalid("url is required".to_string()));
        }
        if self.interval.is_zero() {
            return Err(ConfigError::Invalid("interval must be positive".to_string()));
        }
        if self.timeout.connect.checked_add(self.timeout.read).is_none() {
            return Err(ConfigError::Invalid(
                "combined connect+read timeout overflows".to_string(),
            ));
        }
        Ok(())
    }

    /// Merged cookie list for the run: cookie-file entries first, inline
    /// entries after, so an inline cookie overrides a file cookie of the
    /// same name once both land in the jar.
    pub fn cookie_set(&self) -> Result<Vec<CookieEntry>, ConfigError> {
        let mut cookies = Vec::new();
        if let Some(path) = &self.cookie_file {
            cookies.extend(cookie_file::load_cookies(path)?);
        }
        cookies.extend(self.cookies.iter().cloned());
        Ok(cookies)
    }
}
