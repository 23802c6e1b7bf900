//! The probe engine: one GET per tick, redirects evaluated hop by hop,
//! failures classified, successes validated, one result per tick.

use std::time::Instant;

use chrono::Local;
use tokio::sync::oneshot;
use tokio::time::{interval_at, timeout, Instant as TokioInstant, MissedTickBehavior};
use url::Url;

use crate::config::{ConfigError, ProbeConfig};
use crate::probe::assert::Assertor;
use crate::probe::classify::TransportError;
use crate::probe::client::{HopResponse, IsahcTransport, ProbeTransport};
use crate::probe::hooks;
use crate::probe::redirect::{
    is_redirect, resolve_location, RedirectDecision, RedirectPolicy, RedirectState,
};
use crate::probe::sink::{ConsoleSink, ResultSink};
use crate::probe::types::{Diagnostic, ProbeError, ProbeResult, ResultCode};

/// Owns the run's HTTP client, assertion engine and scheduling loop.
///
/// Construction performs all fallible setup (URL parsing, pattern
/// compilation, cookie loading, client creation); after that the loop can
/// only be stopped by the cancellation signal.
pub struct Prober {
    config: ProbeConfig,
    target: Url,
    assertor: Assertor,
    policy: RedirectPolicy,
    transport: Box<dyn ProbeTransport>,
    sink: Box<dyn ResultSink>,
}

impl Prober {
    /// Build a prober from a validated configuration.
    ///
    /// # Errors
    /// Configuration problems (unparseable URL, zero interval, malformed
    /// assertion pattern, unreadable cookie file) and HTTP client creation
    /// failures are fatal here, before the first tick.
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        let target = Url::parse(&config.url)
            .map_err(|e| ConfigError::Invalid(format!("invalid url {:?}: {e}", config.url)))?;
        if config.interval.is_zero() {
            return Err(ConfigError::Invalid("interval must be positive".to_string()).into());
        }

        let assertor = Assertor::from_rules(&config.asserts)?;
        let policy = RedirectPolicy::new(&config.follow_redirects);
        let cookies = config.cookie_set()?;
        let transport: Box<dyn ProbeTransport> = Box::new(IsahcTransport::new(&cookies, &target)?);
        let sink: Box<dyn ResultSink> = Box::new(ConsoleSink::new(&config));

        Ok(Self {
            config,
            target,
            assertor,
            policy,
            transport,
            sink,
        })
    }

    /// Replace the HTTP transport (primarily for testing)
    pub fn with_transport(mut self, transport: Box<dyn ProbeTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the result sink (primarily for testing)
    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Execute one probe and classify its outcome.
    ///
    /// The whole request lifecycle, every redirect hop and the body read
    /// included, runs under one combined connect+read deadline. Elapsed
    /// time is measured on the monotonic clock regardless of outcome.
    pub async fn probe_once(&self) -> ProbeResult {
        let requested_at = Local::now();
        let start = Instant::now();
        let outcome = timeout(self.config.combined_timeout(), self.follow_chain()).await;
        let elapsed = start.elapsed();

        match outcome {
            Err(_) => {
                let error = TransportError::Timeout(format!(
                    "combined connect+read deadline of {:?} exceeded",
                    self.config.combined_timeout()
                ));
                tracing::debug!(%error, "probe failed");
                ProbeResult {
                    requested_at,
                    code: error.result_code(),
                    elapsed,
                    detail: None,
                }
            }
            Ok(Err(error)) => {
                tracing::debug!(%error, "probe failed");
                ProbeResult {
                    requested_at,
                    code: error.result_code(),
                    elapsed,
                    detail: None,
                }
            }
            Ok(Ok(response)) => match self.assertor.validate(response.status, &response.body) {
                Ok(()) => ProbeResult {
                    requested_at,
                    code: ResultCode::Http(response.status),
                    elapsed,
                    detail: None,
                },
                Err(failure) => ProbeResult {
                    requested_at,
                    code: ResultCode::AssertFailed,
                    elapsed,
                    detail: Some(Diagnostic::new(
                        failure.to_string(),
                        response.headers,
                        &response.body,
                    )),
                },
            },
        }
    }

    /// Send the request and follow redirect hops until a terminal response
    /// or a failure.
    async fn follow_chain(&self) -> Result<HopResponse, TransportError> {
        let mut url = self.target.clone();
        let mut state = RedirectState::default();
        loop {
            let response = self.transport.fetch(url.as_str()).await?;
            if !is_redirect(response.status) {
                return Ok(response);
            }
            let location = match response.header("location") {
                Some(value) => value.to_string(),
                // A redirect without Location is terminal with its literal status
                None => return Ok(response),
            };
            let next = resolve_location(&url, &location)?;
            match self.policy.evaluate(&mut state, next.as_str())? {
                RedirectDecision::Stop => return Ok(response),
                RedirectDecision::Follow => {
                    tracing::debug!(from = %url, to = %next, hop = state.hops(), "following redirect");
                    url = next;
                }
            }
        }
    }

    /// Drive the tick loop until the cancellation signal fires.
    ///
    /// Cancellation is checked with priority over the next tick; an
    /// in-flight probe is never preempted, it runs to its own deadline and
    /// the signal is observed on the following iteration. Ticks that fire
    /// while a probe is still running are skipped, never queued.
    pub async fn run(&mut self, mut shutdown: oneshot::Receiver<()>) {
        if let Some(command) = self.config.hooks.on_start.clone() {
            hooks::run_on_start(&command).await;
        }

        let period = self.config.interval;
        let mut ticker = interval_at(TokioInstant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(url = %self.target, interval = ?period, "probe loop started");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::debug!("cancellation received, stopping probe loop");
                    return;
                }
                _ = ticker.tick() => {
                    let result = self.probe_once().await;
                    self.sink.emit(&result);
                }
            }
        }
    }
}
