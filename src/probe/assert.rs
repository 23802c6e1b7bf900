//! Response assertion engine.
//!
//! Each configured axis is evaluated independently and all must pass. The
//! patterns are compiled once when the engine is built, so a malformed
//! pattern is a startup configuration error rather than a per-tick failure.

use regex::bytes::Regex as BytesRegex;
use regex::Regex;

use crate::config::{AssertionRules, ConfigError};

/// One failed assertion axis, naming the observed value
#[derive(Debug, thiserror::Error)]
pub enum AssertFailure {
    #[error("status code {observed} not in expected values {expected:?}")]
    StatusNotInSet { observed: u16, expected: Vec<u16> },
    #[error("status code {observed} does not match pattern {pattern:?}")]
    StatusPatternMismatch { observed: u16, pattern: String },
    #[error("body does not match pattern {pattern:?}")]
    BodyPatternMismatch { pattern: String },
}

/// Compiled assertion rules for the run
#[derive(Debug)]
pub struct Assertor {
    status_values: Vec<u16>,
    status_pattern: Option<Regex>,
    body_pattern: Option<BytesRegex>,
}

impl Assertor {
    /// Compile the configured rules.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a malformed pattern.
    pub fn from_rules(rules: &AssertionRules) -> Result<Self, ConfigError> {
        let status_pattern = match &rules.status_code.regex {
            Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("invalid status_code regex: {e}"))
            })?),
            None => None,
        };
        let body_pattern = match &rules.body.regex {
            Some(pattern) => Some(BytesRegex::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("invalid body regex: {e}"))
            })?),
            None => None,
        };
        Ok(Self {
            status_values: rules.status_code.values.clone(),
            status_pattern,
            body_pattern,
        })
    }

    /// Validate a completed response against every configured axis.
    pub fn validate(&self, status: u16, body: &[u8]) -> Result<(), AssertFailure> {
        if !self.status_values.is_empty() && !self.status_values.contains(&status) {
            return Err(AssertFailure::StatusNotInSet {
                observed: status,
                expected: self.status_values.clone(),
            });
        }

        if let Some(pattern) = &self.status_pattern {
            if !pattern.is_match(&status.to_string()) {
                return Err(AssertFailure::StatusPatternMismatch {
                    observed: status,
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        if let Some(pattern) = &self.body_pattern {
            if !pattern.is_match(body) {
                return Err(AssertFailure::BodyPatternMismatch {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        Ok(())
    }
}
