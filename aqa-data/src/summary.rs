//! Descriptive statistics over the raw (non-interpolated) series.

use aqa_series::{dataset::Dataset, pollutant::Pollutant, series::TimeSeries};
use serde::Serialize;

/// Mean, extremes and spread of the valid observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Sample standard deviation (N - 1); undefined for a single observation
    pub std_dev: Option<f64>,
}

/// Per-pollutant summaries; `None` marks a pollutant with no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable(pub [Option<Summary>; 4]);

impl SummaryTable {
    pub fn get(&self, pollutant: Pollutant) -> Option<&Summary> {
        self.0[pollutant.index()].as_ref()
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn summarize(series: &TimeSeries) -> Option<Summary> {
    let values: Vec<f64> = series.observations().map(|(_, v)| v).collect();
    let mean = mean(&values)?;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    Some(Summary {
        count: values.len(),
        mean,
        max,
        min,
        std_dev: sample_std_dev(&values),
    })
}

pub fn summarize_dataset(dataset: &Dataset) -> SummaryTable {
    SummaryTable(Pollutant::ALL.map(|p| summarize(dataset.series(p))))
}
