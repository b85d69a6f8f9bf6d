use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Murmur speech-to-text service
#[derive(Debug, Parser)]
#[command(name = "murmur", about = "HTTP front end for Google Cloud Speech-to-Text")]
pub struct Args {
    /// Path to configuration file; configuration is read from the environment when omitted
    #[arg(short, long, env = "MURMUR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "MURMUR_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter used when the configuration does not set one
    #[arg(long, default_value = "info", env = "MURMUR_LOG")]
    pub log_filter: String,
}
