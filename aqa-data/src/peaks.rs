//! Highest-concentration days.

use aqa_series::{dataset::Dataset, pollutant::Pollutant, series::TimeSeries};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakEntry {
    pub date: NaiveDate,
    pub pollutant: Pollutant,
    pub value: f64,
}

/// Peaks per pollutant, in [`Pollutant::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakTable(pub [Vec<PeakEntry>; 4]);

impl PeakTable {
    pub fn get(&self, pollutant: Pollutant) -> &[PeakEntry] {
        &self.0[pollutant.index()]
    }
}

/// The `n` largest valid values, highest first; equal values keep the
/// earlier date first.
pub fn top_peaks(series: &TimeSeries, n: usize) -> Vec<PeakEntry> {
    let mut entries: Vec<PeakEntry> = series
        .observations()
        .map(|(date, value)| PeakEntry {
            date,
            pollutant: series.pollutant(),
            value,
        })
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value).then(a.date.cmp(&b.date)));
    entries.truncate(n);
    entries
}

pub fn peaks_for_dataset(dataset: &Dataset, n: usize) -> PeakTable {
    PeakTable(Pollutant::ALL.map(|p| top_peaks(dataset.series(p), n)))
}
