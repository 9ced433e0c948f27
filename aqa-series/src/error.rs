//! Error types for loading and analysing air quality series.
use crate::pollutant::Pollutant;
use serde::Serialize;
use thiserror::Error;

/// Fatal errors raised while reading the source table.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Input could not be read
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// No header matched a known date column name
    #[error("No date column found (expected one of: {expected})")]
    MissingDateColumn { expected: String },

    /// A required pollutant has no column under any known alias
    #[error("No column found for required pollutant {pollutant} (aliases: {aliases})")]
    MissingPollutantColumn {
        pollutant: Pollutant,
        aliases: String,
    },

    /// Year range is inverted or out of the calendar
    #[error("Invalid year range: {start_year} to {end_year}")]
    InvalidYearRange { start_year: i32, end_year: i32 },

    /// Source parsed but nothing falls within the configured years
    #[error("No rows with a valid date between {start_year} and {end_year}")]
    NoRowsInRange { start_year: i32, end_year: i32 },

    /// Parsed rows did not form an aligned dataset
    #[error("Inconsistent dataset: {0}")]
    Series(#[from] SeriesError),
}

/// A statistical stage lacked the data it needs. Sibling stages are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InsufficientDataError {
    /// Fewer valid observations than the stage needs
    #[error("Insufficient data: needed at least {needed} valid observations, found {found}")]
    TooFewObservations { needed: usize, found: usize },

    /// Every valid observation has the same value
    #[error("Insufficient data: all {found} valid observations are identical")]
    ConstantSeries { found: usize },

    /// Nothing left after gap filling
    #[error("Insufficient data: series is entirely missing")]
    AllMissing,

    /// Observed span shorter than two seasonal periods
    #[error("Insufficient data: span of {found} points is shorter than two periods ({needed})")]
    TooShortForPeriod { needed: usize, found: usize },

    /// Gaps left no complete moving-average window
    #[error("Insufficient data: no complete moving-average window of {window} points")]
    NoCompleteWindow { window: usize },
}

/// Invalid run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the expected shape
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// Start year after end year
    #[error("Invalid year range: start year {start_year} is after end year {end_year}")]
    InvalidYearRange { start_year: i32, end_year: i32 },

    /// A numeric option is outside its allowed range
    #[error("Invalid value for {option}: {reason}")]
    InvalidValue {
        option: &'static str,
        reason: String,
    },
}

/// Violations of the series invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// Series in a dataset do not share one date index
    #[error("Series for {pollutant} does not share the dataset date index")]
    IndexMismatch { pollutant: Pollutant },

    /// Series stored under the wrong pollutant slot
    #[error("Expected series for {expected}, found {found}")]
    WrongPollutant {
        expected: Pollutant,
        found: Pollutant,
    },
}

/// Type alias for Results using LoadError
pub type LoadResult<T> = std::result::Result<T, LoadError>;
