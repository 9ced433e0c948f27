//! One analysis run: every stage, in order, over one dataset.
//!
//! Loading failures never reach this point. Stages that lack data store an
//! [`InsufficientDataError`] in their slot and the rest of the run continues.

use crate::{
    coverage::{analyze_coverage, CoverageReport},
    decomposition::{decompose, DecompositionResult},
    interpolation::fill_dataset,
    monthly::{monthly_distribution, resample_monthly, MonthlyDistribution},
    peaks::{peaks_for_dataset, PeakTable},
    rolling::rolling_mean,
    seasonal::{seasonal_means, SeasonSummary},
    summary::{summarize_dataset, SummaryTable},
    trend::{kendall_trend, TrendResult},
};
use aqa_series::{
    config::{AnalysisConfig, DecompositionFrequency},
    dataset::Dataset,
    error::InsufficientDataError,
    pollutant::Pollutant,
    series::TimeSeries,
};
use log::{info, warn};

/// Everything computed in one run, handed to the renderers.
#[derive(Debug, Clone)]
pub struct AnalysisResults {
    pub raw: Dataset,
    /// Interpolated copy, only for decomposition and charts
    pub gap_filled: Dataset,
    pub coverage: CoverageReport,
    pub summary: SummaryTable,
    pub seasonal: SeasonSummary,
    pub peaks: PeakTable,
    pub trend: Result<TrendResult, InsufficientDataError>,
    pub decomposition_frequency: DecompositionFrequency,
    pub decomposition: Result<DecompositionResult, InsufficientDataError>,
    /// Trailing mean of each raw series, [`Pollutant::ALL`] order
    pub rolling: [TimeSeries; 4],
    pub monthly_distribution: MonthlyDistribution,
}

impl AnalysisResults {
    pub fn rolling_for(&self, pollutant: Pollutant) -> &TimeSeries {
        &self.rolling[pollutant.index()]
    }
}

/// Input series for the decomposition at the configured sampling frequency.
pub fn decomposition_input(
    gap_filled: &Dataset,
    pollutant: Pollutant,
    frequency: DecompositionFrequency,
) -> TimeSeries {
    let series = gap_filled.series(pollutant);
    match frequency {
        DecompositionFrequency::Daily => series.clone(),
        DecompositionFrequency::Monthly => resample_monthly(series),
    }
}

pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> AnalysisResults {
    info!(
        "Analysing {} days from {} to {}",
        dataset.num_days(),
        dataset.start(),
        dataset.end()
    );

    let coverage = analyze_coverage(dataset);
    for entry in &coverage.entries {
        info!(
            "{:5}: {:4} days ({:.1}%)",
            entry.pollutant.label(),
            entry.valid_days,
            entry.percent
        );
    }

    let gap_filled = fill_dataset(dataset, config.gap_fill_limit_days);
    let summary = summarize_dataset(dataset);
    for pollutant in Pollutant::ALL {
        if summary.get(pollutant).is_none() {
            warn!("{} has no valid observations", pollutant);
        }
    }
    let seasonal = seasonal_means(dataset);
    let peaks = peaks_for_dataset(dataset, config.peak_count);

    let trend = kendall_trend(
        dataset.series(config.trend_test_pollutant),
        config.significance_level,
    );
    match &trend {
        Ok(t) => info!(
            "Kendall trend for {}: n={}, tau={:.3}, p={:.3}",
            t.pollutant, t.n, t.tau, t.p_value
        ),
        Err(e) => warn!("Trend test for {} unavailable: {}", config.trend_test_pollutant, e),
    }

    let decomposition_series = decomposition_input(
        &gap_filled,
        config.decomposition_pollutant,
        config.decomposition_frequency,
    );
    let decomposition = decompose(&decomposition_series, config.decomposition_period());
    match &decomposition {
        Ok(d) => info!(
            "Decomposed {} ({} frequency, period {}): {} trend points",
            d.pollutant,
            config.decomposition_frequency,
            d.period,
            d.trend_points()
        ),
        Err(e) => warn!(
            "Decomposition for {} unavailable: {}",
            config.decomposition_pollutant, e
        ),
    }

    let rolling = Pollutant::ALL.map(|p| {
        rolling_mean(
            dataset.series(p),
            config.rolling_window_days,
            config.rolling_min_periods,
        )
    });
    let monthly_distribution = monthly_distribution(dataset.series(config.distribution_pollutant));

    AnalysisResults {
        raw: dataset.clone(),
        gap_filled,
        coverage,
        summary,
        seasonal,
        peaks,
        trend,
        decomposition_frequency: config.decomposition_frequency,
        decomposition,
        rolling,
        monthly_distribution,
    }
}
