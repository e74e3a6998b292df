//! Cascade CLI - incremental stylesheet build watcher
//!
//! Usage: cascade <COMMAND>
//!
//! Commands:
//!   build   Compile all sources and write the aggregate output once
//!   watch   Watch sources, recompile changed units, re-aggregate continuously

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build { paths } => commands::build::cmd_build(paths, cli.json, cli.verbose),
        Commands::Watch { paths } => commands::watch::cmd_watch(paths, cli.json),
    }
}
