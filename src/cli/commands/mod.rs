//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler loads what it needs (configuration, fixture store), calls
//! into the library and prints JSON or TOML on stdout. Diagnostics go
//! through `tracing` to stderr.
//!
//! `compile` and `inspect` read a JSON fixture through
//! [`crate::store::MemoryStore`]; compile runs on a tokio runtime because
//! the store contract is async.

mod codec;
mod compile;
mod config_cmd;

pub use codec::{flatten, unflatten};
pub use compile::{compile, inspect};
pub use config_cmd::config;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde_json::Value;

use super::args::Command;
use crate::core::config::{Config, ConfigLoadResult};

/// Settings shared by every handler.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Explicit `--config` path
    pub config_path: Option<PathBuf>,
    pub quiet: bool,
}

impl Context {
    /// Load configuration and log its warnings.
    pub fn load_config(&self) -> Result<ConfigLoadResult> {
        let result =
            Config::load(self.config_path.as_deref()).context("Failed to load configuration")?;
        for warning in &result.warnings {
            tracing::warn!(origin = %warning.origin, "{}", warning.message);
        }
        Ok(result)
    }
}

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Compile {
            slug_path,
            store,
            draft,
            relations_depth,
            compact,
        } => compile(ctx, &slug_path, &store, draft, relations_depth, compact),
        Command::Inspect {
            slug_path,
            store,
            mode,
            compact,
        } => inspect(ctx, &slug_path, &store, mode.into(), compact),
        Command::Flatten { file, compact } => flatten(file.as_deref(), compact),
        Command::Unflatten { file, compact } => unflatten(file.as_deref(), compact),
        Command::Config => config(ctx),
    }
}

/// Print `value` as JSON on stdout.
fn print_json(value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("Failed to render JSON")?;
    println!("{}", rendered);
    Ok(())
}
