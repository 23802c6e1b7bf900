//! Lifecycle hook execution.

use tokio::process::Command;

/// Run the configured start hook and wait for it to finish.
///
/// Best-effort: a spawn failure or non-zero exit is reported as a warning
/// and never stops the run.
pub async fn run_on_start(command: &str) {
    match Command::new(command).status().await {
        Ok(status) if status.success() => {
            tracing::debug!(%command, "start hook finished");
        }
        Ok(status) => {
            tracing::warn!(%command, %status, "start hook exited with failure");
        }
        Err(error) => {
            tracing::warn!(%command, %error, "failed to execute start hook");
        }
    }
}
