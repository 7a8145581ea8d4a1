//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "reelvault",
    about = "Self-hosted video upload and streaming server",
    version
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the upload and streaming server (the default).
    Serve {
        /// Override the configured listen host.
        #[arg(long)]
        host: Option<String>,

        /// Override the configured listen port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load and validate the configuration, then exit.
    CheckConfig,

    /// Report availability of the external media tools.
    CheckTools,
}
