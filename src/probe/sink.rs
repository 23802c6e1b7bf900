//! Result emission: stdout line, diagnostics and the templated file log.

use std::fs::OpenOptions;
use std::io::Write;

use chrono::{DateTime, Local, SecondsFormat};

use crate::config::{LogConfig, ProbeConfig};
use crate::probe::types::ProbeResult;

/// Stdout timestamp: local offset with millisecond precision
const STDOUT_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";
/// `{{run-start}}` rendering in the log path template
const RUN_START_FORMAT: &str = "%Y%m%d%H%M%S";

/// Consumer of per-tick probe results.
///
/// `Send + Sync` so a boxed sink keeps the owning prober usable from a
/// spawned task.
pub trait ResultSink: Send + Sync {
    fn emit(&mut self, result: &ProbeResult);
}

/// Production sink: TSV line to stdout, assertion detail to the diagnostics
/// channel, optional forwarding to the file log.
pub struct ConsoleSink {
    log: Option<LogWriter>,
}

impl ConsoleSink {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            log: config
                .log
                .as_ref()
                .map(|descriptor| LogWriter::new(descriptor.clone(), config.started_at)),
        }
    }
}

impl ResultSink for ConsoleSink {
    fn emit(&mut self, result: &ProbeResult) {
        println!("{}", format_line(result));

        if let Some(detail) = &result.detail {
            tracing::warn!(
                reason = %detail.reason,
                headers = ?detail.headers,
                body = %detail.body_excerpt,
                "assert failed"
            );
        }

        if let Some(log) = &self.log {
            // Per-write failures must not stop the loop
            if let Err(error) = log.append(result) {
                tracing::warn!(%error, "failed to write log entry");
            }
        }
    }
}

/// Render the stdout record for one result:
/// `timestamp \t status-or-symbol \t duration`.
fn format_line(result: &ProbeResult) -> String {
    format!(
        "{}\t{}\t{:?}",
        result.requested_at.format(STDOUT_TIMESTAMP),
        result.code,
        result.elapsed
    )
}

/// Template rendering failure for a log path or line
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown template key {0:?}")]
    UnknownKey(String),
    #[error("unterminated placeholder in template {0:?}")]
    Unterminated(String),
}

/// One failed log write
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("log io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Appends rendered lines to the configured log file.
///
/// Both templates are rendered on every write, so a malformed template
/// surfaces as a per-write error while the probe loop keeps running.
pub struct LogWriter {
    descriptor: LogConfig,
    run_start: DateTime<Local>,
}

impl LogWriter {
    pub fn new(descriptor: LogConfig, run_start: DateTime<Local>) -> Self {
        Self {
            descriptor,
            run_start,
        }
    }

    /// Render the path and line templates for one result and append the
    /// line, creating the file if absent.
    pub fn append(&self, result: &ProbeResult) -> Result<(), LogError> {
        let path = render_template(
            &self.descriptor.path,
            &[(
                "run-start",
                self.run_start.format(RUN_START_FORMAT).to_string(),
            )],
        )?;
        let line = render_template(
            &self.descriptor.format,
            &[
                (
                    "timestamp",
                    result
                        .requested_at
                        .to_rfc3339_opts(SecondsFormat::Secs, false),
                ),
                ("status", result.code.code().to_string()),
                ("duration", format!("{:?}", result.elapsed)),
            ],
        )?;

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Substitute `{{key}}` placeholders from a fixed field set.
fn render_template(template: &str, fields: &[(&str, String)]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = match after.find("}}") {
            Some(index) => index,
            None => return Err(TemplateError::Unterminated(template.to_string())),
        };
        let key = after[..close].trim();
        match fields.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => return Err(TemplateError::UnknownKey(key.to_string())),
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
