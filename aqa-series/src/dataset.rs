use crate::{
    date_range::DateRange, error::SeriesError, pollutant::Pollutant, series::TimeSeries,
};
use chrono::NaiveDate;
use serde::Serialize;

/// Exactly four pollutant series sharing one daily date index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    range: DateRange,
    series: [TimeSeries; 4],
}

impl Dataset {
    /// Assemble a dataset. Every series must be daily over `range` and stored
    /// in [`Pollutant::ALL`] order.
    pub fn new(range: DateRange, series: [TimeSeries; 4]) -> Result<Dataset, SeriesError> {
        let expected: Vec<NaiveDate> = range.collect();
        for (slot, s) in Pollutant::ALL.iter().zip(series.iter()) {
            if s.pollutant() != *slot {
                return Err(SeriesError::WrongPollutant {
                    expected: *slot,
                    found: s.pollutant(),
                });
            }
            if s.dates() != expected.as_slice() {
                return Err(SeriesError::IndexMismatch {
                    pollutant: s.pollutant(),
                });
            }
        }
        Ok(Dataset { range, series })
    }

    /// Build from per-day rows of `[pm25, pm10, o3, no2]`, one row per day in `range`.
    /// Missing trailing rows are treated as missing values.
    pub fn from_rows(range: DateRange, rows: &[[Option<f64>; 4]]) -> Result<Dataset, SeriesError> {
        let days = range.num_days();
        let series = Pollutant::ALL.map(|pollutant| {
            let values = (0..days)
                .map(|i| rows.get(i).and_then(|row| row[pollutant.index()]))
                .collect();
            TimeSeries::daily(pollutant, range.start(), values)
        });
        Dataset::new(range, series)
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn start(&self) -> NaiveDate {
        self.range.start()
    }

    pub fn end(&self) -> NaiveDate {
        self.range.end()
    }

    /// Days in the calendar, both endpoints included.
    pub fn num_days(&self) -> usize {
        self.range.num_days()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.series[0].dates()
    }

    pub fn series(&self, pollutant: Pollutant) -> &TimeSeries {
        &self.series[pollutant.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSeries> {
        self.series.iter()
    }

    /// Derive a new dataset by transforming each series' values. The date
    /// index is kept regardless of what `f` returns.
    pub fn map_series<F>(&self, mut f: F) -> Dataset
    where
        F: FnMut(&TimeSeries) -> Vec<Option<f64>>,
    {
        let series = self.series.clone().map(|s| {
            let values = f(&s);
            s.with_values(values)
        });
        Dataset {
            range: self.range,
            series,
        }
    }
}
