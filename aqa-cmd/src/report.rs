//! Markdown report assembled from one set of analysis results.
//!
//! Anything a stage could not compute is shown as `no data` or with the
//! reason it was unavailable, never as a number.

use aqa_data::pipeline::AnalysisResults;
use aqa_series::{
    config::{AnalysisConfig, DecompositionFrequency},
    pollutant::Pollutant,
    season::Season,
};
use aqa_utils::{dates::format_date, numbers::format_or_no_data};
use std::fmt::Write;

pub const REPORT_FILE: &str = "air_quality_report.md";

/// Decimals shown for concentrations of `pollutant`.
fn decimals(pollutant: Pollutant) -> usize {
    match pollutant {
        Pollutant::O3 => 4,
        _ => 2,
    }
}

/// Render the full report. `files` lists the artifacts written before it.
pub fn render_report(
    results: &AnalysisResults,
    config: &AnalysisConfig,
    files: &[String],
) -> Result<String, std::fmt::Error> {
    let mut md = String::new();
    let raw = &results.raw;

    writeln!(
        md,
        "# Air Quality Analysis Report ({}-{})\n",
        raw.start().format("%Y"),
        raw.end().format("%Y")
    )?;
    writeln!(md, "## Summary")?;
    writeln!(
        md,
        "This analysis examines {} daily concentrations. Statistics use the raw measurements; \
         charts and the decomposition use a gap-filled copy.\n",
        Pollutant::ALL.map(|p| p.label()).join(", ")
    )?;

    writeln!(md, "## Data Overview")?;
    writeln!(
        md,
        "- Period: {} to {}",
        format_date(&raw.start()),
        format_date(&raw.end())
    )?;
    writeln!(md, "- Days analyzed: {}\n", raw.num_days())?;

    writeln!(md, "## Data availability")?;
    for entry in &results.coverage.entries {
        writeln!(
            md,
            "- {}: {} days ({:.1}% coverage)",
            entry.pollutant.label(),
            entry.valid_days,
            entry.percent
        )?;
    }
    writeln!(md)?;

    writeln!(md, "## Summary statistics")?;
    writeln!(md, "| Pollutant | Unit | Days | Mean | Max | Min | Std. dev. |")?;
    writeln!(md, "|---|---|---|---|---|---|---|")?;
    for pollutant in Pollutant::ALL {
        let stats = results.summary.get(pollutant);
        let d = decimals(pollutant);
        writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} | {} |",
            pollutant.label(),
            pollutant.unit(),
            stats.map_or(0, |s| s.count),
            format_or_no_data(stats.map(|s| s.mean), d),
            format_or_no_data(stats.map(|s| s.max), d),
            format_or_no_data(stats.map(|s| s.min), d),
            format_or_no_data(stats.and_then(|s| s.std_dev), d),
        )?;
    }
    writeln!(md)?;

    writeln!(md, "## Seasonal averages")?;
    writeln!(
        md,
        "| Season | {} |",
        Pollutant::ALL.map(|p| p.label()).join(" | ")
    )?;
    writeln!(md, "|---|---|---|---|---|")?;
    for season in Season::ALL {
        let cells: Vec<String> = Pollutant::ALL
            .iter()
            .map(|&p| format_or_no_data(results.seasonal.mean(season, p), decimals(p)))
            .collect();
        writeln!(md, "| {} | {} |", season.label(), cells.join(" | "))?;
    }
    writeln!(md)?;

    writeln!(
        md,
        "## Peak concentrations (Top {} days by pollutant)",
        config.peak_count
    )?;
    for pollutant in Pollutant::ALL {
        let peaks = results.peaks.get(pollutant);
        if peaks.is_empty() {
            continue;
        }
        writeln!(md, "### {}", pollutant.label())?;
        for peak in peaks {
            writeln!(
                md,
                "- {}: {:.*}",
                format_date(&peak.date),
                decimals(pollutant),
                peak.value
            )?;
        }
        writeln!(md)?;
    }
    writeln!(md)?;

    writeln!(
        md,
        "## Trend test (Kendall tau) for {}",
        config.trend_test_pollutant.label()
    )?;
    match &results.trend {
        Ok(trend) => {
            writeln!(md, "- Observations: {}", trend.n)?;
            writeln!(md, "- Kendall tau: {:.3}", trend.tau)?;
            writeln!(md, "- p-value: {:.3}", trend.p_value)?;
            if trend.significant {
                writeln!(
                    md,
                    "- Interpretation: statistically significant {} monotonic trend detected (p < {})\n",
                    trend.direction(),
                    config.significance_level
                )?;
            } else {
                writeln!(
                    md,
                    "- Interpretation: no statistically significant monotonic trend detected (p >= {})\n",
                    config.significance_level
                )?;
            }
        }
        Err(reason) => writeln!(md, "- Not enough data for trend testing. {}\n", reason)?,
    }

    writeln!(
        md,
        "## Seasonal decomposition for {}",
        config.decomposition_pollutant.label()
    )?;
    writeln!(
        md,
        "- Frequency: {} (period {})",
        results.decomposition_frequency,
        results.decomposition_frequency.period()
    )?;
    match &results.decomposition {
        Ok(decomposition) => {
            writeln!(
                md,
                "- Trend points defined: {} of {}",
                decomposition.trend_points(),
                decomposition.observed.len()
            )?;
            writeln!(md, "- Model: additive (observed = trend + seasonal + residual)\n")?;
        }
        Err(reason) => writeln!(md, "- Decomposition unavailable. {}\n", reason)?,
    }

    writeln!(md, "## Notes & Methods")?;
    writeln!(
        md,
        "- Missing daily values were linearly interpolated for decomposition and visualization only, \
         for gaps of at most {} days. Longer gaps and gaps at either end of the period stay missing.",
        config.gap_fill_limit_days
    )?;
    writeln!(
        md,
        "- Availability, summary statistics, seasonal averages, peaks and the trend test use the raw measurements."
    )?;
    let period = results.decomposition_frequency.period();
    let unit = match results.decomposition_frequency {
        DecompositionFrequency::Daily => "days",
        DecompositionFrequency::Monthly => "months",
    };
    write!(
        md,
        "- The decomposition trend is a centered moving average over one period of {} {}, \
         so it is undefined for the first and last {} {}.",
        period,
        unit,
        period / 2,
        unit
    )?;
    match &results.decomposition {
        Ok(decomposition) if !decomposition.observed.is_empty() => writeln!(
            md,
            " In this run {} of {} points ({:.0}%) have a trend value.",
            decomposition.trend_points(),
            decomposition.observed.len(),
            100.0 * decomposition.trend_points() as f64 / decomposition.observed.len() as f64
        )?,
        _ => writeln!(md)?,
    }
    writeln!(
        md,
        "- The trend test p-value uses the normal approximation with a correction for tied values.\n"
    )?;

    writeln!(md, "## Files generated")?;
    for file in files {
        writeln!(md, "- {}", file)?;
    }
    writeln!(md, "- {}", REPORT_FILE)?;
    Ok(md)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqa_data::pipeline::analyze;
    use aqa_series::{dataset::Dataset, date_range::DateRange};

    fn results_for(rows: &[[Option<f64>; 4]], config: &AnalysisConfig) -> AnalysisResults {
        let range = DateRange::for_years(2000, 2000).unwrap();
        let mut full = rows.to_vec();
        full.resize(range.num_days(), [None; 4]);
        analyze(&Dataset::from_rows(range, &full).unwrap(), config)
    }

    #[test]
    fn test_missing_pollutant_renders_no_data() {
        let config = AnalysisConfig::default();
        let rows: Vec<[Option<f64>; 4]> = (0..366)
            .map(|i| [Some(10.0 + (i % 7) as f64), Some(20.0), None, None])
            .collect();
        let results = results_for(&rows, &config);
        let md = render_report(&results, &config, &["pollutants_timeseries.svg".to_string()]).unwrap();

        assert!(md.starts_with("# Air Quality Analysis Report (2000-2000)"));
        assert!(md.contains("- Days analyzed: 366"));
        assert!(md.contains("- PM2.5: 366 days (100.0% coverage)"));
        assert!(md.contains("- O3: 0 days (0.0% coverage)"));
        assert!(md.contains("| O3 | ppm | 0 | no data | no data | no data | no data |"));
        assert!(md.contains("| Winter | "));
        // peaks skip pollutants without data
        assert!(md.contains("### PM10"));
        assert!(!md.contains("### NO2"));
        assert!(md.contains("- Observations: 366"));
        assert!(md.contains("- pollutants_timeseries.svg\n- air_quality_report.md"));
    }

    #[test]
    fn test_unavailable_stages_show_reason() {
        let config = AnalysisConfig::default();
        let results = results_for(&[], &config);
        let md = render_report(&results, &config, &[]).unwrap();

        assert!(md.contains("- PM2.5: 0 days (0.0% coverage)"));
        assert!(md.contains("Not enough data for trend testing."));
        assert!(md.contains("Decomposition unavailable. Insufficient data: series is entirely missing"));
        assert!(!md.contains("- Kendall tau:"));
        assert!(!md.contains("NaN"));
        assert!(md.contains("| Summer | no data | no data | no data | no data |"));
    }

    #[test]
    fn test_short_series_reports_period_problem() {
        let config = AnalysisConfig::default();
        let rows: Vec<[Option<f64>; 4]> = (0..366).map(|i| [Some(i as f64), None, None, None]).collect();
        let results = results_for(&rows, &config);
        let md = render_report(&results, &config, &[]).unwrap();

        assert!(md.contains("- Frequency: daily (period 365)"));
        assert!(md.contains("shorter than two periods (730)"));
        assert!(md.contains("one period of 365 days, so it is undefined for the first and last 182 days."));
        assert!(!md.contains("In this run"));
        assert!(md.contains("statistically significant increasing monotonic trend"));
    }

    #[test]
    fn test_decomposition_note_follows_frequency() {
        let config = AnalysisConfig {
            decomposition_frequency: DecompositionFrequency::Monthly,
            ..AnalysisConfig::default()
        };
        let range = DateRange::for_years(2000, 2002).unwrap();
        let rows: Vec<[Option<f64>; 4]> = (0..range.num_days())
            .map(|i| [Some(10.0 + (i % 30) as f64), None, None, None])
            .collect();
        let results = analyze(&Dataset::from_rows(range, &rows).unwrap(), &config);
        let md = render_report(&results, &config, &[]).unwrap();

        assert!(md.contains("- Frequency: monthly (period 12)"));
        assert!(md.contains("one period of 12 months, so it is undefined for the first and last 6 months."));
        assert!(md.contains("In this run 24 of 36 points (67%) have a trend value."));
        assert!(!md.contains("365 days"));
    }
}
