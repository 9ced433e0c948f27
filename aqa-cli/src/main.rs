//! AQA CLI - Command line tool for analysing daily air quality measurements.

use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(
    name = "aqa-cli",
    version,
    about = "Air quality analysis toolkit: coverage, trends, seasonality, charts and reports"
)]
struct Cli {
    #[command(subcommand)]
    command: aqa_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("Starting aqa-cli {}", env!("CARGO_PKG_VERSION"));
    aqa_cmd::run(cli.command)
}
