use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Cascade - incremental stylesheet build watcher
#[derive(Parser, Debug)]
#[command(name = "cascade")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Path overrides shared by both commands; unset values fall back to
/// cascade.toml, then CASCADE_* environment variables, then defaults.
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Source directory of stylesheet units
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Aggregate output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Staging directory for compiled units (wiped on every start)
    #[arg(long)]
    pub staging: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile all sources and write the aggregate output once
    Build {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Watch sources, recompile changed units, re-aggregate continuously
    Watch {
        #[command(flatten)]
        paths: PathArgs,
    },
}
