//! Calendar-month views of a series: box plot statistics and month means.

use aqa_series::{pollutant::Pollutant, series::TimeSeries};
use aqa_utils::dates::first_of_month;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Five-number summary of one month's observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Observations grouped by calendar month, January first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyDistribution {
    pub pollutant: Pollutant,
    pub months: [Option<BoxStats>; 12],
}

/// Quantile of sorted data with linear interpolation between order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(BoxStats {
        count: sorted.len(),
        min: *sorted.first()?,
        q1: quantile(&sorted, 0.25)?,
        median: quantile(&sorted, 0.5)?,
        q3: quantile(&sorted, 0.75)?,
        max: *sorted.last()?,
    })
}

/// Group the raw observations of `series` by calendar month.
pub fn monthly_distribution(series: &TimeSeries) -> MonthlyDistribution {
    let mut buckets: [Vec<f64>; 12] = Default::default();
    for (date, value) in series.observations() {
        buckets[date.month0() as usize].push(value);
    }
    MonthlyDistribution {
        pollutant: series.pollutant(),
        months: buckets.map(|values| box_stats(&values)),
    }
}

/// Mean of the present values in each month spanned by `series`. A month
/// with no value is missing.
pub fn resample_monthly(series: &TimeSeries) -> TimeSeries {
    let Some(first_date) = series.dates().first() else {
        return TimeSeries::monthly(series.pollutant(), NaiveDate::MIN, Vec::new());
    };
    let mut months: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (date, value) in series.iter() {
        let cell = months.entry(first_of_month(&date)).or_insert((0.0, 0));
        if let Some(v) = value {
            cell.0 += v;
            cell.1 += 1;
        }
    }
    let values = months
        .values()
        .map(|&(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect();
    TimeSeries::monthly(series.pollutant(), *first_date, values)
}
