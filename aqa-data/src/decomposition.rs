//! Additive seasonal decomposition: observed = trend + seasonal + residual.
//!
//! The trend is a centered moving average over one period. For an odd period
//! the window has `period` equal weights; for an even period it spans
//! `period + 1` points with half weight at both ends. A trend value exists
//! only where the full window lies inside the observed span and has no gaps,
//! so the first and last half-period are always missing. With a 365-day
//! period on three years of data that is roughly a third of the series.

use aqa_series::{error::InsufficientDataError, pollutant::Pollutant, series::TimeSeries};
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionResult {
    pub pollutant: Pollutant,
    pub period: usize,
    pub observed: TimeSeries,
    pub trend: TimeSeries,
    pub seasonal: TimeSeries,
    pub residual: TimeSeries,
}

impl DecompositionResult {
    /// Number of points where the trend is defined.
    pub fn trend_points(&self) -> usize {
        self.trend.valid_count()
    }

    /// One period of the seasonal pattern, starting at the first observation.
    pub fn seasonal_pattern(&self) -> Vec<Option<f64>> {
        let start = self.observed.valid_span().map(|(first, _)| first).unwrap_or(0);
        self.seasonal
            .values()
            .iter()
            .skip(start)
            .take(self.period)
            .copied()
            .collect()
    }
}

/// Moving-average weights for `period`.
pub fn trend_weights(period: usize) -> Vec<f64> {
    let period = period.max(1);
    let p = period as f64;
    if period % 2 == 1 {
        vec![1.0 / p; period]
    } else {
        let mut weights = vec![1.0 / p; period + 1];
        weights[0] = 0.5 / p;
        weights[period] = 0.5 / p;
        weights
    }
}

/// Decompose a gap-filled series with a fixed seasonal `period`.
pub fn decompose(
    series: &TimeSeries,
    period: usize,
) -> Result<DecompositionResult, InsufficientDataError> {
    let period = period.max(1);
    let values = series.values();
    let (first, last) = series
        .valid_span()
        .ok_or(InsufficientDataError::AllMissing)?;
    let span = last - first + 1;
    if span < 2 * period {
        return Err(InsufficientDataError::TooShortForPeriod {
            needed: 2 * period,
            found: span,
        });
    }

    let weights = trend_weights(period);
    let half = weights.len() / 2;
    let mut trend = vec![None; values.len()];
    for (i, slot) in trend
        .iter_mut()
        .enumerate()
        .take(last + 1 - half)
        .skip(first + half)
    {
        let window = &values[i - half..=i + half];
        let mut total = 0.0;
        let mut complete = true;
        for (w, v) in weights.iter().zip(window) {
            match v {
                Some(v) => total += w * v,
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if complete {
            *slot = Some(total);
        }
    }
    if trend.iter().all(Option::is_none) {
        return Err(InsufficientDataError::NoCompleteWindow {
            window: weights.len(),
        });
    }

    // average the detrended values per phase of the period
    let mut phase_sums = vec![(0.0f64, 0usize); period];
    for i in first..=last {
        if let (Some(v), Some(t)) = (values[i], trend[i]) {
            let phase = &mut phase_sums[(i - first) % period];
            phase.0 += v - t;
            phase.1 += 1;
        }
    }
    let mut pattern: Vec<Option<f64>> = phase_sums
        .iter()
        .map(|&(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect();
    let present: Vec<f64> = pattern.iter().flatten().copied().collect();
    let centre = present.iter().sum::<f64>() / present.len().max(1) as f64;
    for p in pattern.iter_mut().flatten() {
        *p -= centre;
    }
    let missing_phases = pattern.iter().filter(|p| p.is_none()).count();
    if missing_phases > 0 {
        debug!(
            "{} of {} seasonal phases have no detrended values",
            missing_phases, period
        );
    }

    let seasonal: Vec<Option<f64>> = (0..values.len())
        .map(|i| {
            if i < first || i > last {
                None
            } else {
                pattern[(i - first) % period]
            }
        })
        .collect();

    let residual: Vec<Option<f64>> = values
        .iter()
        .zip(trend.iter().zip(seasonal.iter()))
        .map(|(v, (t, s))| match (v, t, s) {
            (Some(v), Some(t), Some(s)) => Some(v - t - s),
            _ => None,
        })
        .collect();

    Ok(DecompositionResult {
        pollutant: series.pollutant(),
        period,
        observed: series.clone(),
        trend: series.with_values(trend),
        seasonal: series.with_values(seasonal),
        residual: series.with_values(residual),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: Vec<Option<f64>>) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        TimeSeries::daily(Pollutant::Pm25, start, values)
    }

    /// Linear trend plus a zero-mean pattern repeating every `period` points.
    fn synthetic(len: usize, period: usize) -> Vec<Option<f64>> {
        (0..len)
            .map(|i| {
                let phase = (i % period) as f64 / period as f64;
                Some(10.0 + 0.01 * i as f64 + 3.0 * (2.0 * std::f64::consts::PI * phase).sin())
            })
            .collect()
    }

    #[test]
    fn test_trend_weights() {
        let odd = trend_weights(5);
        assert_eq!(odd.len(), 5);
        assert!(odd.iter().all(|w| (*w - 0.2).abs() < 1e-15));

        let even = trend_weights(12);
        assert_eq!(even.len(), 13);
        assert!((even[0] - 1.0 / 24.0).abs() < 1e-15);
        assert!((even[12] - 1.0 / 24.0).abs() < 1e-15);
        assert!((even.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_reconstructs_observed() {
        let input = series(synthetic(1096, 365));
        let result = decompose(&input, 365).unwrap();
        assert_eq!(result.trend.len(), 1096);
        assert_eq!(result.seasonal.len(), 1096);
        assert_eq!(result.residual.len(), 1096);
        for i in 0..input.len() {
            if let (Some(t), Some(r)) = (result.trend.values()[i], result.residual.values()[i]) {
                let s = result.seasonal.values()[i].unwrap();
                let observed = input.values()[i].unwrap();
                assert!((t + s + r - observed).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_trend_missing_for_first_and_last_half_period() {
        let input = series(synthetic(1096, 365));
        let result = decompose(&input, 365).unwrap();
        let trend = result.trend.values();
        assert!(trend[..182].iter().all(Option::is_none));
        assert!(trend[182].is_some());
        assert!(trend[1096 - 183].is_some());
        assert!(trend[1096 - 182..].iter().all(Option::is_none));
        assert_eq!(result.trend_points(), 1096 - 2 * 182);
        assert!(result.residual.values()[..182].iter().all(Option::is_none));
    }

    #[test]
    fn test_recovers_linear_trend_and_pattern() {
        let input = series(synthetic(48, 12));
        let result = decompose(&input, 12).unwrap();
        // a centered 2x12 moving average removes the sine exactly
        for i in 6..42 {
            let expected = 10.0 + 0.01 * i as f64;
            assert!((result.trend.values()[i].unwrap() - expected).abs() < 1e-9);
        }
        let pattern = result.seasonal_pattern();
        assert_eq!(pattern.len(), 12);
        assert!(pattern.iter().flatten().sum::<f64>().abs() < 1e-9);
        assert!((pattern[3].unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_repeats_with_period() {
        let input = series(synthetic(60, 12));
        let result = decompose(&input, 12).unwrap();
        let seasonal = result.seasonal.values();
        for i in 0..48 {
            assert_eq!(seasonal[i], seasonal[i + 12]);
        }
    }

    #[test]
    fn test_edges_and_gaps_are_respected() {
        let mut values = vec![None; 10];
        values.extend(synthetic(60, 12));
        values[40] = None;
        let input = series(values);
        let result = decompose(&input, 12).unwrap();
        // nothing before the first observation
        assert!(result.seasonal.values()[..10].iter().all(Option::is_none));
        // every window touching the gap has no trend
        assert!(result.trend.values()[34..=46].iter().all(Option::is_none));
        assert!(result.trend.values()[33].is_some());
        assert!(result.residual.values()[40].is_none());
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            decompose(&series(vec![None; 800]), 365),
            Err(InsufficientDataError::AllMissing)
        );
        assert_eq!(
            decompose(&series(synthetic(729, 365)), 365),
            Err(InsufficientDataError::TooShortForPeriod {
                needed: 730,
                found: 729
            })
        );
        let mut gappy = synthetic(30, 12);
        for i in (0..30).step_by(5) {
            gappy[i + 1] = None;
        }
        assert_eq!(
            decompose(&series(gappy), 12),
            Err(InsufficientDataError::NoCompleteWindow { window: 13 })
        );
    }
}
