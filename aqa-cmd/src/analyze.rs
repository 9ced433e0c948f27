//! The `analyze` and `coverage` commands.

use crate::{
    export::{analysis_json, cleaned_daily_csv, CSV_FILE, JSON_FILE},
    output::OutputWriter,
    plot::{
        boxplot_file, decomposition_file, decomposition_svg, monthly_boxplot_svg, seasonal_svg,
        timeseries_svg, SEASONAL_FILE, TIMESERIES_FILE,
    },
    report::{render_report, REPORT_FILE},
};
use anyhow::Context;
use aqa_data::{
    coverage::{analyze_coverage, CoverageReport},
    pipeline::{analyze, AnalysisResults},
};
use aqa_series::{
    config::{AnalysisConfig, DecompositionFrequency},
    loader::{DatasetLoader, LoadedDataset},
    pollutant::Pollutant,
};
use clap::Args;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Command line values that replace the config file or defaults when given.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Directory for all generated files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// First calendar year to include
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last calendar year to include
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Longest run of missing days to interpolate
    #[arg(long)]
    pub gap_fill_limit: Option<usize>,

    /// Number of peak days listed per pollutant
    #[arg(long)]
    pub peak_count: Option<usize>,

    #[arg(long)]
    pub decomposition_pollutant: Option<Pollutant>,

    /// daily (period 365) or monthly (period 12)
    #[arg(long)]
    pub decomposition_frequency: Option<DecompositionFrequency>,

    #[arg(long)]
    pub trend_pollutant: Option<Pollutant>,

    /// Pollutant shown in the monthly box plot
    #[arg(long)]
    pub distribution_pollutant: Option<Pollutant>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_directory = dir.clone();
        }
        if let Some(year) = self.start_year {
            config.start_year = year;
        }
        if let Some(year) = self.end_year {
            config.end_year = year;
        }
        if let Some(limit) = self.gap_fill_limit {
            config.gap_fill_limit_days = limit;
        }
        if let Some(count) = self.peak_count {
            config.peak_count = count;
        }
        if let Some(pollutant) = self.decomposition_pollutant {
            config.decomposition_pollutant = pollutant;
        }
        if let Some(frequency) = self.decomposition_frequency {
            config.decomposition_frequency = frequency;
        }
        if let Some(pollutant) = self.trend_pollutant {
            config.trend_test_pollutant = pollutant;
        }
        if let Some(pollutant) = self.distribution_pollutant {
            config.distribution_pollutant = pollutant;
        }
    }
}

/// Defaults, then the optional JSON file, then command line overrides.
pub fn build_config(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<AnalysisConfig> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            AnalysisConfig::from_json_file(path)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

pub fn load_dataset(input: &Path, config: &AnalysisConfig) -> anyhow::Result<LoadedDataset> {
    let loaded = DatasetLoader::new(config.start_year, config.end_year)
        .with_required(config.required_pollutants())
        .load_path(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let summary = &loaded.summary;
    info!(
        "Loaded {} rows: {} to {} ({} invalid dates, {} out of range, {} duplicate dates)",
        summary.rows_read,
        loaded.dataset.start(),
        loaded.dataset.end(),
        summary.rows_invalid_date,
        summary.rows_out_of_range,
        summary.duplicate_dates
    );
    Ok(loaded)
}

/// Write every artifact. The report goes last so it can list the others.
pub fn write_artifacts(
    results: &AnalysisResults,
    config: &AnalysisConfig,
    plots: bool,
) -> OutputWriter {
    let mut writer = OutputWriter::new(&config.output_directory);
    let palette = &config.palette;

    if plots {
        writer.write("time series plot", TIMESERIES_FILE, || {
            timeseries_svg(results, config.rolling_window_days, palette)
        });
        writer.write(
            "monthly box plot",
            &boxplot_file(config.distribution_pollutant),
            || monthly_boxplot_svg(&results.monthly_distribution, palette),
        );
        writer.write("seasonal plot", SEASONAL_FILE, || {
            seasonal_svg(&results.seasonal, palette)
        });
        match &results.decomposition {
            Ok(decomposition) => {
                writer.write(
                    "decomposition plot",
                    &decomposition_file(decomposition.pollutant),
                    || decomposition_svg(decomposition, palette),
                );
            }
            Err(reason) => warn!("Skipping decomposition plot: {}", reason),
        }
    } else {
        info!("Plots disabled");
    }

    writer.write("analysis JSON", JSON_FILE, || analysis_json(results));
    writer.write("cleaned daily CSV", CSV_FILE, || cleaned_daily_csv(results));

    let files = writer.written_names();
    writer.write("report", REPORT_FILE, || {
        Ok(render_report(results, config, &files)?)
    });
    writer
}

pub fn run_analyze(input: &Path, config: &AnalysisConfig, plots: bool) -> anyhow::Result<()> {
    let loaded = load_dataset(input, config)?;
    let results = analyze(&loaded.dataset, config);
    let writer = write_artifacts(&results, config, plots);

    println!("Generated files in {}:", writer.directory().display());
    for path in writer.written() {
        println!(" - {}", path.display());
    }
    if !writer.failures().is_empty() {
        println!("Failed artifacts:");
        for failure in writer.failures() {
            println!(" - {}", failure);
        }
    }
    Ok(())
}

/// One line per pollutant, e.g. `PM2.5: 1094 days (99.8%)`.
pub fn coverage_lines(report: &CoverageReport) -> Vec<String> {
    report
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{:5}: {:4} days ({:.1}%)",
                entry.pollutant.label(),
                entry.valid_days,
                entry.percent
            )
        })
        .collect()
}

pub fn run_coverage(
    input: &Path,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> anyhow::Result<()> {
    let defaults = AnalysisConfig::default();
    let start_year = start_year.unwrap_or(defaults.start_year);
    let end_year = end_year.unwrap_or(defaults.end_year);
    let loaded = DatasetLoader::new(start_year, end_year)
        .load_path(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let report = analyze_coverage(&loaded.dataset);

    println!(
        "{} to {} ({} days)",
        loaded.dataset.start(),
        loaded.dataset.end(),
        report.total_days
    );
    for line in coverage_lines(&report) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aqa-analyze-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Three years of daily rows with a seasonal PM2.5 cycle.
    fn sample_csv() -> String {
        let mut csv = String::from("Date,pm25tmean2,PM10TMEAN2,o3tmean2\n");
        let mut date = chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let mut i = 0;
        while date.format("%Y").to_string() != "2003" {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / 365.0;
            let pm25 = if i % 50 == 3 {
                String::new()
            } else {
                format!("{:.2}", 14.0 + 5.0 * angle.cos() + (i % 3) as f64)
            };
            csv.push_str(&format!(
                "{},{},{},{:.3}\n",
                date.format("%Y-%m-%d"),
                pm25,
                25 + i % 11,
                0.02 + 0.01 * angle.sin()
            ));
            date = date.succ_opt().unwrap();
            i += 1;
        }
        csv
    }

    #[test]
    fn test_overrides_take_precedence_over_file() {
        let dir = scratch_dir("config");
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"peak_count": 3, "gap_fill_limit_days": 2, "start_year": 2001}"#)
            .unwrap();
        let overrides = ConfigOverrides {
            peak_count: Some(10),
            decomposition_frequency: Some(DecompositionFrequency::Monthly),
            ..ConfigOverrides::default()
        };

        let config = build_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.peak_count, 10);
        assert_eq!(config.gap_fill_limit_days, 2);
        assert_eq!(config.start_year, 2001);
        assert_eq!(config.end_year, 2002);
        assert_eq!(config.decomposition_period(), 12);

        let bad = ConfigOverrides {
            start_year: Some(2005),
            ..ConfigOverrides::default()
        };
        assert!(build_config(Some(&path), &bad).is_err());
        assert!(build_config(Some(&dir.join("missing.json")), &overrides).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_flag_repairs_year_range_from_file() {
        let dir = scratch_dir("layering");
        let path = dir.join("config.json");
        // 2004 is after the default end year and only valid once --end-year applies
        std::fs::write(&path, r#"{"start_year": 2004}"#).unwrap();
        let overrides = ConfigOverrides {
            end_year: Some(2006),
            ..ConfigOverrides::default()
        };

        let config = build_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.start_year, 2004);
        assert_eq!(config.end_year, 2006);

        assert!(build_config(Some(&path), &ConfigOverrides::default()).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_full_run_writes_every_artifact() {
        let dir = scratch_dir("run");
        let input = dir.join("air.csv");
        std::fs::write(&input, sample_csv()).unwrap();
        let overrides = ConfigOverrides {
            output_dir: Some(dir.join("out")),
            ..ConfigOverrides::default()
        };
        let config = build_config(None, &overrides).unwrap();

        let loaded = load_dataset(&input, &config).unwrap();
        assert_eq!(loaded.dataset.num_days(), 1096);
        assert_eq!(loaded.summary.column_for(Pollutant::No2), None);

        let results = analyze(&loaded.dataset, &config);
        let writer = write_artifacts(&results, &config, true);
        assert!(writer.failures().is_empty());
        assert_eq!(
            writer.written_names(),
            vec![
                "pollutants_timeseries.svg",
                "monthly_boxplot_pm25.svg",
                "seasonal_analysis.svg",
                "decomposition_pm25.svg",
                "analysis.json",
                "cleaned_daily.csv",
                "air_quality_report.md",
            ]
        );

        let report = std::fs::read_to_string(dir.join("out").join(REPORT_FILE)).unwrap();
        assert!(report.contains("- Days analyzed: 1096"));
        assert!(report.contains("- NO2: 0 days (0.0% coverage)"));
        assert!(report.contains("- decomposition_pm25.svg"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_no_plots_writes_only_exports_and_report() {
        let dir = scratch_dir("noplots");
        let input = dir.join("air.csv");
        std::fs::write(&input, sample_csv()).unwrap();
        let config = AnalysisConfig {
            output_directory: dir.join("out"),
            ..AnalysisConfig::default()
        };
        run_analyze(&input, &config, false).unwrap();

        let out = dir.join("out");
        assert!(out.join(JSON_FILE).exists());
        assert!(out.join(CSV_FILE).exists());
        assert!(out.join(REPORT_FILE).exists());
        assert!(!out.join(TIMESERIES_FILE).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let dir = scratch_dir("fatal");
        let input = dir.join("air.csv");
        std::fs::write(&input, "date,pm10\n2000-01-01,20\n").unwrap();
        let config = AnalysisConfig {
            output_directory: dir.join("out"),
            ..AnalysisConfig::default()
        };

        let err = run_analyze(&input, &config, true).unwrap_err();
        assert!(format!("{:#}", err).contains("PM2.5"));
        assert!(!dir.join("out").exists());

        // coverage has no required columns
        assert!(run_coverage(&input, None, None).is_ok());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_coverage_lines_format() {
        let loaded = DatasetLoader::new(2000, 2000)
            .load_str("date,pm25,no2\n2000-01-01,5,\n2000-01-02,6,7\n")
            .unwrap();
        let lines = coverage_lines(&analyze_coverage(&loaded.dataset));
        assert_eq!(lines[0], "PM2.5:    2 days (0.5%)");
        assert_eq!(lines[3], "NO2  :    1 days (0.3%)");
    }
}
