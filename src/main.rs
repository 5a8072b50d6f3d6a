mod aggregate;
mod cli;
mod error;
pub(crate) mod git;
mod input;
mod logging;
mod report;

pub(crate) use error::{AppError, AppResult};

use clap::Parser;
use std::process::exit;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    logging::setup_logger(cli.verbosity.tracing_level_filter(), cli.use_ansi());
    if let Err(e) = cli.run().await {
        tracing_indicatif::indicatif_eprintln!("error: {}", e);
        exit(1);
    }
}
