//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Route registry and live update tool for generated docs sites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: docroute.toml)
    #[arg(short = 'C', long, default_value = "docroute.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the registry from the manifest and report problems
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Also load every page and report load failures
        #[arg(long)]
        pages: bool,
    },

    /// Show how a path resolves
    #[command(visible_alias = "r")]
    Resolve {
        /// Path to resolve, e.g. `/guide/` or `/documentation/index.html`
        path: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Load the page and print its data as JSON
        #[arg(short, long)]
        data: bool,
    },

    /// Watch the manifest and push route updates to browsers
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        source: SourceArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for live updates
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

/// Where to read routes from.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Route manifest (overrides `routes.manifest`, relative to cwd)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,
}

impl Commands {
    pub fn source(&self) -> &SourceArgs {
        match self {
            Self::Check { source, .. } | Self::Resolve { source, .. } | Self::Serve { source, .. } => {
                source
            }
        }
    }
}
