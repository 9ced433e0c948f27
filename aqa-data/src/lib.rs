//! Statistical pipeline for air quality observations.
//!
//! Every stage reads the raw series except the seasonal decomposition and the
//! plots, which use the gap-filled copy produced by [`interpolation`].

pub mod coverage;
pub mod decomposition;
pub mod monthly;
pub mod peaks;
pub mod pipeline;
pub mod rolling;
pub mod seasonal;
pub mod summary;
pub mod trend;

/// Linear interpolation for filling short gaps in observation data.
pub mod interpolation {
    use aqa_series::{dataset::Dataset, series::TimeSeries};

    /// Linearly interpolate the missing values strictly between two valid
    /// points `steps` positions apart.
    ///
    /// Returns `steps - 1` values; an adjacent pair yields nothing.
    pub fn interpolate_between(start: f64, end: f64, steps: usize) -> Vec<f64> {
        if steps <= 1 {
            return Vec::new();
        }
        let slope = (end - start) / steps as f64;
        (1..steps).map(|i| start + slope * i as f64).collect()
    }

    /// Fill runs of at most `max_gap` missing values lying between two valid
    /// observations. Longer runs stay missing as a whole, and leading or
    /// trailing runs are never filled.
    pub fn fill_gaps(series: &TimeSeries, max_gap: usize) -> TimeSeries {
        let values = series.values();
        let mut filled = values.to_vec();
        let mut previous: Option<(usize, f64)> = None;

        for (i, value) in values.iter().enumerate() {
            let Some(v) = value else {
                continue;
            };
            if let Some((start_idx, start_value)) = previous {
                let run = i - start_idx - 1;
                if run > 0 && run <= max_gap {
                    let interpolated = interpolate_between(start_value, *v, i - start_idx);
                    for (offset, fill) in interpolated.into_iter().enumerate() {
                        filled[start_idx + 1 + offset] = Some(fill);
                    }
                }
            }
            previous = Some((i, *v));
        }

        series.with_values(filled)
    }

    /// Gap-filled copy of every series in the dataset.
    pub fn fill_dataset(dataset: &Dataset, max_gap: usize) -> Dataset {
        dataset.map_series(|series| fill_gaps(series, max_gap).values().to_vec())
    }

}
