//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Only log errors

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::content::ParseMode;

/// burdy-content - compile flat post meta into render-ready documents
#[derive(Parser, Debug)]
#[command(name = "burdy-content")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Content view for `inspect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    /// Editor view, references kept as raw markers
    #[default]
    Internal,
    /// Public view, references replaced by placeholders
    Public,
}

impl From<ModeArg> for ParseMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Internal => ParseMode::Internal,
            ModeArg::Public => ParseMode::Public,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a post with its references resolved
    #[command(after_help = "\
EXAMPLES:
    # Compile the page at slug path 'about' from a fixture store
    burdy-content compile about --store fixtures/site.json

    # Include drafts and expand only one level of references
    burdy-content compile blog/launch --store site.json --draft --relations-depth 1")]
    Compile {
        /// Slug path of the post to compile
        slug_path: String,

        /// JSON fixture holding `posts` and `assets`
        #[arg(long, value_name = "FIXTURE")]
        store: PathBuf,

        /// Resolve drafts and scheduled posts too
        #[arg(long)]
        draft: bool,

        /// Expand at most this many levels of post references
        #[arg(long, value_name = "N")]
        relations_depth: Option<u32>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the parsed content tree of a post without resolving references
    Inspect {
        /// Slug path of the post to inspect
        slug_path: String,

        /// JSON fixture holding `posts` and `assets`
        #[arg(long, value_name = "FIXTURE")]
        store: PathBuf,

        /// Which view of the content to show
        #[arg(long, value_enum, default_value_t = ModeArg::Internal)]
        mode: ModeArg,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Flatten a JSON document into path/value pairs
    Flatten {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Rebuild a JSON document from path/value pairs
    Unflatten {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the effective configuration
    Config,
}
