//! CLI module for searchx
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP search server
//! - query: One-shot search read from stdin
//! - lookup: Postal code bounding rectangle

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_service, lookup, query, run, run_command, serve};
pub use config::{Config, StoreConfig};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_error, write_response};
