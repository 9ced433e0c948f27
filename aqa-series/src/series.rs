use crate::pollutant::Pollutant;
use chrono::{Months, NaiveDate};
use serde::Serialize;

/// Ordered date → value mapping for one pollutant.
///
/// Dates are unique and strictly increasing. A missing observation is `None`,
/// never a numeric placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pollutant: Pollutant,
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl TimeSeries {
    /// Daily series starting at `start`, one value per consecutive day.
    pub fn daily(pollutant: Pollutant, start: NaiveDate, values: Vec<Option<f64>>) -> TimeSeries {
        let dates = start.iter_days().take(values.len()).collect();
        TimeSeries {
            pollutant,
            dates,
            values,
        }
    }

    /// Monthly series, one value per month, each dated on the 1st.
    /// `start` is moved to the first day of its month.
    pub fn monthly(pollutant: Pollutant, start: NaiveDate, values: Vec<Option<f64>>) -> TimeSeries {
        let first = aqa_utils::dates::first_of_month(&start);
        let dates: Vec<NaiveDate> = (0..values.len() as u32)
            .map_while(|i| first.checked_add_months(Months::new(i)))
            .collect();
        let mut values = values;
        values.truncate(dates.len());
        TimeSeries {
            pollutant,
            dates,
            values,
        }
    }

    /// Same dates, new values. A short vector is padded with missing values
    /// and a long one is truncated so the date index is preserved.
    pub fn with_values(&self, mut values: Vec<Option<f64>>) -> TimeSeries {
        values.resize(self.dates.len(), None);
        TimeSeries {
            pollutant: self.pollutant,
            dates: self.dates.clone(),
            values,
        }
    }

    pub fn pollutant(&self) -> Pollutant {
        self.pollutant
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value on `date`, or `None` when the date is absent or the value missing.
    pub fn value_on(&self, date: &NaiveDate) -> Option<f64> {
        let index = self.dates.binary_search(date).ok()?;
        self.values[index]
    }

    /// All entries including missing ones.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Only the present observations, in date order.
    pub fn observations(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.iter().filter_map(|(date, value)| value.map(|v| (date, v)))
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Index of the first and last present value.
    pub fn valid_span(&self) -> Option<(usize, usize)> {
        let first = self.values.iter().position(Option::is_some)?;
        let last = self.values.iter().rposition(Option::is_some)?;
        Some((first, last))
    }
}
