//! Core domain types for the air quality analysis toolkit.
//!
//! A [`dataset::Dataset`] holds exactly four pollutant series on one shared
//! daily calendar. It is built once per run by the [`loader::DatasetLoader`]
//! and consumed read-only by the statistics in `aqa-data`.

pub mod config;
pub mod dataset;
pub mod date_range;
pub mod error;
pub mod loader;
pub mod pollutant;
pub mod season;
pub mod series;
