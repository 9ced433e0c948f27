//! Seasonal means per pollutant.

use aqa_series::{dataset::Dataset, pollutant::Pollutant, season::Season};
use serde::Serialize;

/// One (season, pollutant) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonCell {
    pub season: Season,
    pub pollutant: Pollutant,
    pub count: usize,
    /// `None` when the season has no observation for this pollutant
    pub mean: Option<f64>,
}

/// Mean concentration per season (rows, in [`Season::ALL`] order) and
/// pollutant (columns, in [`Pollutant::ALL`] order).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub cells: [[SeasonCell; 4]; 4],
}

impl SeasonSummary {
    pub fn cell(&self, season: Season, pollutant: Pollutant) -> &SeasonCell {
        &self.cells[season.index()][pollutant.index()]
    }

    pub fn mean(&self, season: Season, pollutant: Pollutant) -> Option<f64> {
        self.cell(season, pollutant).mean
    }
}

/// Group raw observations by season and average them.
pub fn seasonal_means(dataset: &Dataset) -> SeasonSummary {
    let mut sums = [[(0.0f64, 0usize); 4]; 4];
    for series in dataset.iter() {
        let column = series.pollutant().index();
        for (date, value) in series.observations() {
            let cell = &mut sums[Season::of(&date).index()][column];
            cell.0 += value;
            cell.1 += 1;
        }
    }

    let cells = Season::ALL.map(|season| {
        Pollutant::ALL.map(|pollutant| {
            let (sum, count) = sums[season.index()][pollutant.index()];
            SeasonCell {
                season,
                pollutant,
                count,
                mean: (count > 0).then(|| sum / count as f64),
            }
        })
    });
    SeasonSummary { cells }
}
