//! Probe engine: scheduling loop, transport, redirect policy, assertions,
//! failure classification and result emission.

pub mod assert;
pub mod classify;
pub mod client;
pub mod hooks;
pub mod prober;
pub mod redirect;
pub mod sink;
pub mod types;

// Re-export public API
pub use assert::{AssertFailure, Assertor};
pub use classify::{classify_message, TransportError};
pub use client::{HopResponse, IsahcTransport, ProbeTransport};
pub use prober::Prober;
pub use redirect::{is_redirect, RedirectDecision, RedirectPolicy, RedirectState};
pub use sink::{ConsoleSink, LogWriter, ResultSink};
pub use types::{Diagnostic, ProbeError, ProbeResult, ResultCode};
