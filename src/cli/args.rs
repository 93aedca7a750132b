//! CLI argument definitions using clap
//!
//! Commands:
//! - searchx serve --config <path> [--port <port>]
//! - searchx query --config <path>
//! - searchx lookup <postal-code> --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// searchx - listing search over a partitioned key-value store
#[derive(Parser, Debug)]
#[command(name = "searchx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP search server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./searchx.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one search read from stdin and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./searchx.json")]
        config: PathBuf,
    },

    /// Print the bounding rectangle of a postal code
    Lookup {
        /// Postal code (5 digits, optional 4-digit extension)
        postal_code: String,

        /// Path to configuration file
        #[arg(long, default_value = "./searchx.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
