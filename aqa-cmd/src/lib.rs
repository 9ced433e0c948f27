//! Command implementations for the air quality CLI.
//!
//! Provides subcommands for the full analysis run and for a quick look at
//! data availability.

use clap::Subcommand;
use std::path::PathBuf;

pub mod analyze;
pub mod export;
pub mod output;
pub mod plot;
pub mod report;

#[derive(Subcommand)]
pub enum Command {
    /// Run every analysis stage and write the charts, report and exports
    Analyze {
        /// Input CSV with a date column and pollutant columns
        #[arg(short, long)]
        input: PathBuf,

        /// JSON config file; the flags below take precedence over it
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: analyze::ConfigOverrides,

        /// Skip the SVG charts
        #[arg(long)]
        no_plots: bool,
    },

    /// Print how many days each pollutant has a measurement
    Coverage {
        /// Input CSV with a date column and pollutant columns
        #[arg(short, long)]
        input: PathBuf,

        /// First calendar year to include
        #[arg(long)]
        start_year: Option<i32>,

        /// Last calendar year to include
        #[arg(long)]
        end_year: Option<i32>,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Analyze {
            input,
            config,
            overrides,
            no_plots,
        } => {
            let config = analyze::build_config(config.as_deref(), &overrides)?;
            analyze::run_analyze(&input, &config, !no_plots)
        }
        Command::Coverage {
            input,
            start_year,
            end_year,
        } => analyze::run_coverage(&input, start_year, end_year),
    }
}
