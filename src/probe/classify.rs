//! Transport failure classification.
//!
//! Failures are typed at the HTTP-call boundary: the transport maps the
//! structured error kinds its stack exposes straight into [`TransportError`]
//! variants, and only opaque errors fall back to substring matching over the
//! error message.

use crate::probe::types::ResultCode;

/// Transport-level failure of one probe, tagged by category
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("dns lookup failed: {0}")]
    DnsFailure(String),
    #[error("connection failed: {0}")]
    ConnectFailure(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("redirect loop: {0}")]
    RedirectLoop(String),
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Sentinel result code for this failure category.
    pub fn result_code(&self) -> ResultCode {
        match self {
            TransportError::DnsFailure(_) => ResultCode::DnsLookupFailed,
            TransportError::ConnectFailure(_) => ResultCode::ConnectionFailed,
            TransportError::Timeout(_) => ResultCode::Timeout,
            TransportError::RedirectLoop(_) => ResultCode::RedirectLoop,
            TransportError::Other(_) => ResultCode::Unknown,
        }
    }
}

impl From<isahc::Error> for TransportError {
    fn from(error: isahc::Error) -> Self {
        use isahc::error::ErrorKind;

        let message = error.to_string();
        match error.kind() {
            ErrorKind::NameResolution => TransportError::DnsFailure(message),
            ErrorKind::ConnectionFailed => TransportError::ConnectFailure(message),
            ErrorKind::Timeout => TransportError::Timeout(message),
            ErrorKind::TooManyRedirects => TransportError::RedirectLoop(message),
            _ => classify_message(&message),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let message = error.to_string();
        match error.kind() {
            ErrorKind::TimedOut => TransportError::Timeout(message),
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected => TransportError::ConnectFailure(message),
            _ => classify_message(&message),
        }
    }
}

/// Classify an opaque failure by its textual description.
///
/// Fallback path for errors whose category is not carried in a structured
/// kind; the recognized substrings cover the wording of the common network
/// stacks (getaddrinfo, libcurl, OS socket errors).
pub fn classify_message(message: &str) -> TransportError {
    let lower = message.to_lowercase();
    if lower.contains("no such host")
        || lower.contains("could not resolve")
        || lower.contains("couldn't resolve")
        || lower.contains("name resolution")
        || lower.contains("lookup address")
    {
        TransportError::DnsFailure(message.to_string())
    } else if lower.contains("connection refused")
        || lower.contains("connection reset")
        || lower.contains("failed to connect")
        || lower.contains("unreachable")
    {
        TransportError::ConnectFailure(message.to_string())
    } else if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("deadline exceeded")
        || lower.contains("deadline has elapsed")
    {
        TransportError::Timeout(message.to_string())
    } else if (lower.contains("stopped after") && lower.contains("redirects"))
        || lower.contains("too many redirects")
    {
        TransportError::RedirectLoop(message.to_string())
    } else {
        TransportError::Other(message.to_string())
    }
}
