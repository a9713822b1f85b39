mod cli;
mod colors;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    match cli.command {
        Commands::Dump { output } => commands::dump::handle(&output),

        Commands::Scan {
            pattern,
            context_bytes,
        } => commands::scan::handle(&pattern, context_bytes),
    }
}
