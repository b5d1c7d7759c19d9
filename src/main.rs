mod citation;
mod cli;
mod commands;
mod filter;
mod model;
mod pipeline;
mod preprocess;
mod registry;
mod search;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enhance(args) => commands::enhance::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Filter(args) => commands::filter::run(args),
        Commands::Cite(args) => commands::cite::run(args),
        Commands::Ask(args) => commands::ask::run(args),
        Commands::Registry(args) => commands::registry::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
