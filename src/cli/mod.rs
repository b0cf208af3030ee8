//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber (stderr, so stdout stays pure JSON)
//! - Load configuration and delegate to command handlers

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug, cli.quiet);

    let ctx = commands::Context {
        config_path: cli.config.clone(),
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}

/// `--debug` and `--quiet` win over `RUST_LOG`; otherwise `RUST_LOG` or `warn`.
fn init_logging(debug: bool, quiet: bool) {
    let filter = if debug {
        EnvFilter::new("burdy_content=debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init (tests driving `run` twice) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
