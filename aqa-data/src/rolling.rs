//! Trailing moving average used for the trend line on time series charts.

use aqa_series::series::TimeSeries;

/// Trailing mean over `window` positions, present only when at least
/// `min_periods` values in the window are present. The first positions use
/// the shorter window available.
pub fn rolling_mean(series: &TimeSeries, window: usize, min_periods: usize) -> TimeSeries {
    let window = window.max(1);
    let min_periods = min_periods.max(1);
    let values = series.values();
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if let Some(v) = values[i] {
            sum += v;
            count += 1;
        }
        if i >= window {
            if let Some(old) = values[i - window] {
                sum -= old;
                count -= 1;
            }
        }
        out.push((count >= min_periods).then(|| sum / count as f64));
    }

    series.with_values(out)
}
