//! Data availability per pollutant.

use aqa_series::{dataset::Dataset, pollutant::Pollutant, series::TimeSeries};
use aqa_utils::numbers::round_to;
use serde::Serialize;

/// Availability of one pollutant over the full calendar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageEntry {
    pub pollutant: Pollutant,
    pub valid_days: usize,
    pub total_days: usize,
    /// Percentage of days with a value, rounded to one decimal
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total_days: usize,
    pub entries: [CoverageEntry; 4],
}

impl CoverageReport {
    pub fn get(&self, pollutant: Pollutant) -> &CoverageEntry {
        &self.entries[pollutant.index()]
    }
}

pub fn coverage_percent(valid_days: usize, total_days: usize) -> f64 {
    if total_days == 0 {
        return 0.0;
    }
    round_to(100.0 * valid_days as f64 / total_days as f64, 1)
}

/// Coverage of one series against a calendar of `total_days` days.
pub fn series_coverage(series: &TimeSeries, total_days: usize) -> CoverageEntry {
    let valid_days = series.valid_count();
    CoverageEntry {
        pollutant: series.pollutant(),
        valid_days,
        total_days,
        percent: coverage_percent(valid_days, total_days),
    }
}

pub fn analyze_coverage(dataset: &Dataset) -> CoverageReport {
    let total_days = dataset.num_days();
    CoverageReport {
        total_days,
        entries: Pollutant::ALL.map(|p| series_coverage(dataset.series(p), total_days)),
    }
}
