use pulsecheck::cli::Cli;
use pulsecheck::config::ProbeConfig;
use pulsecheck::probe::Prober;

use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    // Diagnostics go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = if let Some(path) = &cli.config {
        ProbeConfig::load(path)?
    } else if let Some(url) = &cli.url {
        ProbeConfig::for_url(url)
    } else {
        // clap enforces exactly one of the two
        return Err("either --config or a URL is required".into());
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    let mut prober = Prober::new(config)?;
    prober.run(shutdown_rx).await;

    Ok(())
}
