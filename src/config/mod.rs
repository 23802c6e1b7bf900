//! Run configuration: YAML model, loader and cookie-file support.

pub mod cookie_file;
pub mod loader;
pub mod types;

// Re-export public API
pub use cookie_file::load_cookies;
pub use types::{
    AssertionRules, BodyRules, ConfigError, CookieEntry, HooksConfig, LogConfig, ProbeConfig,
    RedirectConfig, StatusCodeRules, TimeoutConfig,
};
