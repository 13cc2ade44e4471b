mod chapters;
mod cli;
mod commands;
mod config;
mod error;
mod ffmetadata;
mod merge;
mod probe;
mod scan;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bind(args) => {
            commands::bind::run(&args, cli.verbose, cli.quiet)?;
        }
        Commands::Chapters(args) => {
            commands::chapters::run(&args, cli.verbose, cli.quiet)?;
        }
    }

    Ok(())
}
