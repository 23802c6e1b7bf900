//! Redirect-following policy.
//!
//! The automatic redirect handling of the HTTP client stays off; each 3xx
//! hop is evaluated here instead so the hop budget and the terminal-response
//! rule are applied exactly as configured. There is no cycle detection by
//! URL: a true cycle is caught when the hop budget runs out.

use url::Url;

use crate::config::RedirectConfig;
use crate::probe::classify::TransportError;

/// Statuses treated as redirects when following is enabled
const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

pub fn is_redirect(status: u16) -> bool {
    REDIRECT_STATUSES.contains(&status)
}

/// Per-run redirect policy settings
#[derive(Debug, Clone, Copy)]
pub struct RedirectPolicy {
    enabled: bool,
    max_count: u32,
}

/// Transient per-probe chain state, discarded when the probe completes
#[derive(Debug, Default)]
pub struct RedirectState {
    hops: u32,
    visited: Vec<String>,
}

impl RedirectState {
    pub fn hops(&self) -> u32 {
        self.hops
    }

    /// URLs followed so far, in hop order
    pub fn visited(&self) -> &[String] {
        &self.visited
    }
}

/// Outcome of evaluating one would-be redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Take the hop
    Follow,
    /// Surface the current response as terminal, with its literal status
    Stop,
}

impl RedirectPolicy {
    pub fn new(config: &RedirectConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_count: config.max_count,
        }
    }

    /// Decide whether the next hop may be taken.
    ///
    /// Disabled following stops at the first response. With following
    /// enabled, an exhausted hop budget fails the probe with a
    /// redirect-loop error; otherwise the hop is recorded and followed.
    pub fn evaluate(
        &self,
        state: &mut RedirectState,
        next_url: &str,
    ) -> Result<RedirectDecision, TransportError> {
        if !self.enabled {
            return Ok(RedirectDecision::Stop);
        }
        if state.hops >= self.max_count {
            return Err(TransportError::RedirectLoop(format!(
                "stopped after {} redirects",
                self.max_count
            )));
        }
        state.hops += 1;
        state.visited.push(next_url.to_string());
        Ok(RedirectDecision::Follow)
    }
}

/// Resolve a `Location` header value against the current request URL,
/// allowing relative references.
pub fn resolve_location(current: &Url, location: &str) -> Result<Url, TransportError> {
    current.join(location).map_err(|e| {
        TransportError::Other(format!("invalid redirect location {location:?}: {e}"))
    })
}
