//! CLI module for Sift
//!
//! Provides command-line interface parsing and handling for the sift-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sift - Research Source Orchestration Server
///
/// Resolves candidate sources for a research query, fetches them under a
/// concurrency cap and reports per-source progress.
#[derive(Parser, Debug)]
#[command(
    name = "sift-server",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Sift - Research Source Orchestration Server",
    long_about = "Resolves candidate sources for a research query, fetches them concurrently\n\
                  and reports per-source progress over HTTP.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  sift-server init                      # Scaffold sift.toml and a sample dataset\n    \
                  sift-server                           # Start the server (requires sift.toml)\n    \
                  sift-server --config my.toml          # Use a custom config file\n    \
                  sift-server research \"Ukraine Krieg\"  # Run one research request in the terminal"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "sift.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Reload the configuration file when it changes
    #[arg(long, global = true)]
    pub watch: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new Sift project
    ///
    /// Creates sift.toml and a dataset directory holding one sample entry.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8080")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Only validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Run one research request in-process and print its sources
    Research {
        /// The research query
        query: String,

        /// Domain to search in (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Maximum number of sources
        #[arg(short = 'n', long)]
        max_results: Option<usize>,

        /// Target language code
        #[arg(short, long)]
        language: Option<String>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
