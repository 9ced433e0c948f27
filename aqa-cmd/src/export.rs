//! Machine-readable copies of the results: `analysis.json` and `cleaned_daily.csv`.

use aqa_data::{
    coverage::CoverageEntry, monthly::MonthlyDistribution, peaks::PeakEntry,
    pipeline::AnalysisResults, seasonal::SeasonCell, summary::Summary, trend::TrendResult,
};
use aqa_series::{
    config::DecompositionFrequency, date_range::DateRange, error::InsufficientDataError,
    pollutant::Pollutant, season::Season,
};
use aqa_utils::dates::format_date;
use csv::Writer;
use serde::Serialize;

pub const JSON_FILE: &str = "analysis.json";
pub const CSV_FILE: &str = "cleaned_daily.csv";

/// Outcome of a stage that may lack data.
#[derive(Debug, Serialize)]
struct StageExport<'a, T: Serialize> {
    available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a InsufficientDataError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<'a, T: Serialize> StageExport<'a, T> {
    fn from_result<R>(result: &'a Result<R, InsufficientDataError>, f: impl FnOnce(&'a R) -> T) -> Self {
        match result {
            Ok(r) => StageExport {
                available: true,
                result: Some(f(r)),
                error: None,
                message: None,
            },
            Err(e) => StageExport {
                available: false,
                result: None,
                error: Some(e),
                message: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct DecompositionExport {
    pollutant: Pollutant,
    frequency: DecompositionFrequency,
    period: usize,
    points: usize,
    trend_points: usize,
    /// One period of the seasonal component
    seasonal_pattern: Vec<Option<f64>>,
}

#[derive(Debug, Serialize)]
struct PollutantExport<'a> {
    pollutant: Pollutant,
    coverage: &'a CoverageEntry,
    summary: Option<&'a Summary>,
    seasonal: [&'a SeasonCell; 4],
    peaks: &'a [PeakEntry],
}

#[derive(Debug, Serialize)]
struct AnalysisExport<'a> {
    period: DateRange,
    days: usize,
    pollutants: Vec<PollutantExport<'a>>,
    trend: StageExport<'a, &'a TrendResult>,
    decomposition: StageExport<'a, DecompositionExport>,
    monthly_distribution: &'a MonthlyDistribution,
}

/// Pretty-printed JSON of everything but the daily series.
pub fn analysis_json(results: &AnalysisResults) -> anyhow::Result<String> {
    let pollutants = Pollutant::ALL
        .iter()
        .map(|&p| PollutantExport {
            pollutant: p,
            coverage: results.coverage.get(p),
            summary: results.summary.get(p),
            seasonal: Season::ALL.map(|s| results.seasonal.cell(s, p)),
            peaks: results.peaks.get(p),
        })
        .collect();
    let frequency = results.decomposition_frequency;
    let export = AnalysisExport {
        period: results.raw.range(),
        days: results.raw.num_days(),
        pollutants,
        trend: StageExport::from_result(&results.trend, |t| t),
        decomposition: StageExport::from_result(&results.decomposition, |d| DecompositionExport {
            pollutant: d.pollutant,
            frequency,
            period: d.period,
            points: d.observed.len(),
            trend_points: d.trend_points(),
            seasonal_pattern: d.seasonal_pattern(),
        }),
        monthly_distribution: &results.monthly_distribution,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Date plus raw and gap-filled values per pollutant; missing values are empty cells.
pub fn cleaned_daily_csv(results: &AnalysisResults) -> anyhow::Result<Vec<u8>> {
    let mut writer = Writer::from_writer(vec![]);
    let mut header = vec![String::from("date")];
    for pollutant in Pollutant::ALL {
        header.push(pollutant.slug().to_string());
        header.push(format!("{}_filled", pollutant.slug()));
    }
    writer.write_record(&header)?;

    for (i, date) in results.raw.dates().iter().enumerate() {
        let mut record = vec![format_date(date)];
        for pollutant in Pollutant::ALL {
            record.push(cell(results.raw.series(pollutant).values()[i]));
            record.push(cell(results.gap_filled.series(pollutant).values()[i]));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV buffer: {}", e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqa_data::pipeline::analyze;
    use aqa_series::{config::AnalysisConfig, dataset::Dataset};

    fn small_results() -> AnalysisResults {
        let range = DateRange::for_years(2001, 2001).unwrap();
        let mut rows = vec![[None; 4]; range.num_days()];
        rows[0] = [Some(10.0), None, Some(0.5), None];
        rows[2] = [Some(14.0), None, None, None];
        rows[3] = [Some(11.0), None, None, None];
        analyze(&Dataset::from_rows(range, &rows).unwrap(), &AnalysisConfig::default())
    }

    #[test]
    fn test_csv_has_raw_and_filled_columns() {
        let csv = String::from_utf8(cleaned_daily_csv(&small_results()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 366);
        assert_eq!(
            lines[0],
            "date,pm25,pm25_filled,pm10,pm10_filled,o3,o3_filled,no2,no2_filled"
        );
        assert_eq!(lines[1], "2001-01-01,10,10,,,0.5,0.5,,");
        // 2001-01-02 is interpolated only in the filled column
        assert_eq!(lines[2], "2001-01-02,,12,,,,,,");
        assert_eq!(lines[5], "2001-01-05,,,,,,,,");
    }

    #[test]
    fn test_json_marks_unavailable_stages() {
        let json = analysis_json(&small_results()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["days"], 365);
        assert_eq!(value["pollutants"].as_array().unwrap().len(), 4);
        assert_eq!(value["pollutants"][0]["pollutant"], "PM25");
        assert_eq!(value["pollutants"][0]["coverage"]["valid_days"], 3);
        assert!(value["pollutants"][1]["summary"].is_null());

        assert_eq!(value["trend"]["available"], true);
        assert_eq!(value["trend"]["result"]["n"], 3);
        assert_eq!(value["decomposition"]["available"], false);
        assert_eq!(value["decomposition"]["error"]["reason"], "too_short_for_period");
        assert!(value["decomposition"]["message"]
            .as_str()
            .unwrap()
            .contains("shorter than two periods"));
    }
}
