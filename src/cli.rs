use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pulsecheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Periodic HTTP health probe with latency measurement and response assertions")]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE", conflicts_with = "url")]
    pub config: Option<PathBuf>,

    /// Target URL, probed with default settings when no config file is given
    #[arg(value_name = "URL", required_unless_present = "config")]
    pub url: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
