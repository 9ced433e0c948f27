//! Kendall's tau trend test between time order and value.
//!
//! The statistic is tau-b. Time order never ties, so only ties among the
//! values are corrected for. The two-sided p-value comes from the normal
//! approximation of S with the tie-corrected variance
//!
//! ```text
//! var(S) = (n(n-1)(2n+5) - Σ t(t-1)(2t+5)) / 18
//! ```
//!
//! where `t` runs over the sizes of groups of equal values.

use aqa_series::{error::InsufficientDataError, pollutant::Pollutant, series::TimeSeries};
use serde::Serialize;
use std::cmp::Ordering;

/// Minimum number of valid observations for the test.
pub const MIN_OBSERVATIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendResult {
    pub pollutant: Pollutant,
    /// Valid observations used
    pub n: usize,
    /// Kendall's tau-b in [-1, 1]; negative means decreasing
    pub tau: f64,
    /// Two-sided p-value
    pub p_value: f64,
    pub significant: bool,
}

impl TrendResult {
    pub fn direction(&self) -> &'static str {
        if self.tau > 0.0 {
            "increasing"
        } else if self.tau < 0.0 {
            "decreasing"
        } else {
            "flat"
        }
    }
}

/// Run the test on the raw series; missing values are dropped, not filled.
pub fn kendall_trend(
    series: &TimeSeries,
    alpha: f64,
) -> Result<TrendResult, InsufficientDataError> {
    let values: Vec<f64> = series.observations().map(|(_, v)| v).collect();
    let (tau, p_value) = kendall_tau(&values)?;
    Ok(TrendResult {
        pollutant: series.pollutant(),
        n: values.len(),
        tau,
        p_value,
        significant: p_value < alpha,
    })
}

/// Tau-b and two-sided p-value of `values` against their index order.
pub fn kendall_tau(values: &[f64]) -> Result<(f64, f64), InsufficientDataError> {
    let n = values.len();
    if n < MIN_OBSERVATIONS {
        return Err(InsufficientDataError::TooFewObservations {
            needed: MIN_OBSERVATIONS,
            found: n,
        });
    }

    let mut s: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            // same equality as the tie groups, so -0.0 and 0.0 tie
            s += match values[j].partial_cmp(&values[i]) {
                Some(Ordering::Greater) => 1,
                Some(Ordering::Less) => -1,
                _ => 0,
            };
        }
    }

    let ties = tie_group_sizes(values);
    let n_f = n as f64;
    let total_pairs = n_f * (n_f - 1.0) / 2.0;
    let tied_pairs: f64 = ties.iter().map(|&t| (t * (t - 1)) as f64 / 2.0).sum();
    if total_pairs - tied_pairs <= 0.0 {
        return Err(InsufficientDataError::ConstantSeries { found: n });
    }

    let tau = (s as f64 / (total_pairs * (total_pairs - tied_pairs)).sqrt()).clamp(-1.0, 1.0);

    let tie_variance: f64 = ties
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * (t - 1.0) * (2.0 * t + 5.0)
        })
        .sum();
    let var_s = (n_f * (n_f - 1.0) * (2.0 * n_f + 5.0) - tie_variance) / 18.0;
    let z = s as f64 / var_s.sqrt();
    let p_value = erfc(z.abs() / std::f64::consts::SQRT_2).clamp(0.0, 1.0);

    Ok((tau, p_value))
}

/// Sizes of groups of equal values, only groups larger than one.
fn tie_group_sizes(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut groups = Vec::new();
    let mut run = 1;
    for w in sorted.windows(2) {
        if w[0] == w[1] {
            run += 1;
        } else {
            if run > 1 {
                groups.push(run);
            }
            run = 1;
        }
    }
    if run > 1 {
        groups.push(run);
    }
    groups
}

/// Complementary error function (Chebyshev fit, fractional error below 1.2e-7).
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let r = t * (-z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77)))))))))
        .exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}
