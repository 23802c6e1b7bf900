//! Core probe types: result codes, per-tick results and diagnostics.

use chrono::{DateTime, Local};
use std::time::Duration;

use crate::config::ConfigError;

/// Upper bound on the body excerpt carried in a diagnostic
pub const BODY_EXCERPT_MAX: usize = 2048;

/// Outcome of one probe: either the literal HTTP status or a sentinel
/// standing in for a non-HTTP outcome.
///
/// Sentinel integer values are stable and relied on by log consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Http(u16),
    DnsLookupFailed,
    ConnectionFailed,
    Timeout,
    RedirectLoop,
    AssertFailed,
    Unknown,
}

impl ResultCode {
    /// Numeric form: the HTTP status for successes, a negative sentinel
    /// otherwise.
    pub fn code(&self) -> i32 {
        match self {
            ResultCode::Http(status) => i32::from(*status),
            ResultCode::DnsLookupFailed => -1,
            ResultCode::ConnectionFailed => -2,
            ResultCode::Timeout => -3,
            ResultCode::RedirectLoop => -4,
            ResultCode::AssertFailed => -5,
            ResultCode::Unknown => -999,
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultCode::Http(status) => write!(f, "{}", status),
            ResultCode::DnsLookupFailed => write!(f, "DNS_LOOKUP_FAILED"),
            ResultCode::ConnectionFailed => write!(f, "CONNECTION_FAILED"),
            ResultCode::Timeout => write!(f, "TIMEOUT"),
            ResultCode::RedirectLoop => write!(f, "REDIRECT_LOOP_DETECTED"),
            ResultCode::AssertFailed => write!(f, "ASSERT_FAILED"),
            ResultCode::Unknown => write!(f, "UNKNOWN_ERROR"),
        }
    }
}

/// Result of a single probe, created each tick and consumed immediately
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Wall-clock time the request was issued
    pub requested_at: DateTime<Local>,
    pub code: ResultCode,
    /// Time from request start to completion, measured on the monotonic clock
    pub elapsed: Duration,
    /// Human-facing detail for failed assertions; never drives control flow
    pub detail: Option<Diagnostic>,
}

/// Diagnostic payload attached to an assertion failure
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Which axis failed and the observed value
    pub reason: String,
    /// Response headers, lowercased names in response order
    pub headers: Vec<(String, String)>,
    /// Lossy excerpt of the response body, capped at [`BODY_EXCERPT_MAX`]
    pub body_excerpt: String,
}

impl Diagnostic {
    pub fn new(reason: String, headers: Vec<(String, String)>, body: &[u8]) -> Self {
        let end = body.len().min(BODY_EXCERPT_MAX);
        Self {
            reason,
            headers,
            body_excerpt: String::from_utf8_lossy(&body[..end]).into_owned(),
        }
    }
}

/// Startup errors of the probe engine
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client error: {0}")]
    Client(String),
}
