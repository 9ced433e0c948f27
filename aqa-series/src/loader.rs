//! CSV loading for daily pollutant tables.
//!
//! The source needs a header row with one date column and up to four
//! pollutant columns. Column names are matched case-insensitively against
//! the alias table in [`Pollutant::aliases`].
//!
//! # Example CSV
//! ```text
//! date,pm25tmean2,pm10tmean2,o3tmean2,no2tmean2
//! 2000-01-01,21.5,34.0,0.012,27.3
//! 2000-01-02,,28.0,0.015,22.1
//! ```

use crate::{
    dataset::Dataset,
    date_range::DateRange,
    error::{LoadError, LoadResult},
    pollutant::Pollutant,
};
use aqa_utils::dates::parse_flexible_date;
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use serde::Serialize;
use std::{collections::BTreeMap, io::Read, path::Path};

/// Header names accepted for the date column.
pub const DATE_COLUMN_ALIASES: [&str; 4] = ["date", "datetime", "time", "day"];

/// Cell contents treated as missing in addition to empty cells.
const MISSING_MARKERS: [&str; 5] = ["na", "nan", "null", "none", "---"];

/// Bookkeeping about one load, reported to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadSummary {
    /// Header used for the date column
    pub date_column: String,
    /// Header used for each pollutant, in [`Pollutant::ALL`] order
    pub pollutant_columns: [Option<String>; 4],
    pub rows_read: usize,
    /// Rows whose date could not be parsed
    pub rows_invalid_date: usize,
    /// Rows outside the configured years
    pub rows_out_of_range: usize,
    /// Dates that appeared on more than one row
    pub duplicate_dates: usize,
}

impl LoadSummary {
    pub fn column_for(&self, pollutant: Pollutant) -> Option<&str> {
        self.pollutant_columns[pollutant.index()].as_deref()
    }
}

/// Output of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub summary: LoadSummary,
}

/// Reads a CSV source into a [`Dataset`] restricted to `[start_year, end_year]`.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    start_year: i32,
    end_year: i32,
    required: Vec<Pollutant>,
}

/// Running sum and count per pollutant for one date.
type DayAccumulator = [(f64, usize); 4];

impl DatasetLoader {
    pub fn new(start_year: i32, end_year: i32) -> DatasetLoader {
        DatasetLoader {
            start_year,
            end_year,
            required: Vec::new(),
        }
    }

    /// Pollutants whose column must be present; others may be absent.
    pub fn with_required(mut self, required: Vec<Pollutant>) -> DatasetLoader {
        self.required = required;
        self
    }

    /// Open `path`, read it fully, then parse.
    pub fn load_path(&self, path: &Path) -> LoadResult<LoadedDataset> {
        let contents = std::fs::read_to_string(path)?;
        info!("Read {} bytes from {}", contents.len(), path.display());
        self.load_str(&contents)
    }

    pub fn load_str(&self, csv_data: &str) -> LoadResult<LoadedDataset> {
        self.load_reader(csv_data.as_bytes())
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> LoadResult<LoadedDataset> {
        let range = DateRange::for_years(self.start_year, self.end_year).ok_or(
            LoadError::InvalidYearRange {
                start_year: self.start_year,
                end_year: self.end_year,
            },
        )?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let date_idx = headers
            .iter()
            .position(|h| DATE_COLUMN_ALIASES.contains(&h.to_lowercase().as_str()))
            .ok_or_else(|| LoadError::MissingDateColumn {
                expected: DATE_COLUMN_ALIASES.join(", "),
            })?;

        let mut summary = LoadSummary {
            date_column: headers[date_idx].to_string(),
            ..LoadSummary::default()
        };
        let mut column_idx: [Option<usize>; 4] = [None; 4];
        for pollutant in Pollutant::ALL {
            let found = find_pollutant_column(&headers, pollutant);
            match found {
                Some(idx) => {
                    info!("Detected {} column: {}", pollutant, &headers[idx]);
                    summary.pollutant_columns[pollutant.index()] = Some(headers[idx].to_string());
                }
                None if self.required.contains(&pollutant) => {
                    return Err(LoadError::MissingPollutantColumn {
                        pollutant,
                        aliases: pollutant.aliases().join(", "),
                    });
                }
                None => {
                    warn!(
                        "No column for {} (aliases: {}); treating it as entirely missing",
                        pollutant,
                        pollutant.aliases().join(", ")
                    );
                }
            }
            column_idx[pollutant.index()] = found;
        }

        let mut days: BTreeMap<NaiveDate, (usize, DayAccumulator)> = BTreeMap::new();
        for result in rdr.records() {
            let record = result?;
            summary.rows_read += 1;

            let date = match record.get(date_idx).and_then(parse_flexible_date) {
                Some(d) => d,
                None => {
                    debug!(
                        "Dropping row {} with unparsable date {:?}",
                        summary.rows_read,
                        record.get(date_idx)
                    );
                    summary.rows_invalid_date += 1;
                    continue;
                }
            };
            if date.year() < self.start_year || date.year() > self.end_year {
                summary.rows_out_of_range += 1;
                continue;
            }

            let (rows, accumulator) = days.entry(date).or_insert((0, [(0.0, 0); 4]));
            *rows += 1;
            for pollutant in Pollutant::ALL {
                let value = column_idx[pollutant.index()]
                    .and_then(|idx| record.get(idx))
                    .and_then(parse_value);
                if let Some(v) = value {
                    let cell = &mut accumulator[pollutant.index()];
                    cell.0 += v;
                    cell.1 += 1;
                }
            }
        }

        if days.is_empty() {
            return Err(LoadError::NoRowsInRange {
                start_year: self.start_year,
                end_year: self.end_year,
            });
        }

        summary.duplicate_dates = days.values().filter(|(rows, _)| *rows > 1).count();
        if summary.duplicate_dates > 0 {
            warn!(
                "{} dates appear on more than one row; their values were averaged",
                summary.duplicate_dates
            );
        }

        // reindex onto the full calendar
        let rows: Vec<[Option<f64>; 4]> = range
            .map(|date| match days.get(&date) {
                Some((_, acc)) => (*acc).map(|(sum, count)| (count > 0).then(|| sum / count as f64)),
                None => [None; 4],
            })
            .collect();
        let dataset = Dataset::from_rows(range, &rows)?;

        info!(
            "Loaded {} rows ({} dates) from {} to {}; dropped {} with invalid dates, {} outside {}-{}",
            summary.rows_read,
            days.len(),
            range.start(),
            range.end(),
            summary.rows_invalid_date,
            summary.rows_out_of_range,
            self.start_year,
            self.end_year
        );
        Ok(LoadedDataset { dataset, summary })
    }
}

fn find_pollutant_column(headers: &csv::StringRecord, pollutant: Pollutant) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    pollutant
        .aliases()
        .iter()
        .find_map(|alias| lowered.iter().position(|h| h == alias))
}

/// Parse one numeric cell; anything that is not a finite number is missing.
fn parse_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || MISSING_MARKERS.contains(&cell.to_lowercase().as_str()) {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::{parse_value, DatasetLoader};
    use crate::{error::LoadError, pollutant::Pollutant};
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"city,date,PM25TMEAN2,pm10tmean2,o3tmean2,no2tmean2
chic,1999-12-31,10.0,20.0,0.01,30.0
chic,2000-01-01,21.5,34.0,0.012,27.3
chic,2000-01-02,,28.0,NA,22.1
chic,not-a-date,1.0,1.0,1.0,1.0
chic,2000-01-04,18.0,30.0,0.02,25.0
chic,2003-01-01,5.0,5.0,0.01,5.0
"#;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_load_reindexes_to_full_calendar() {
        let loaded = DatasetLoader::new(2000, 2002)
            .with_required(vec![Pollutant::Pm25])
            .load_str(SAMPLE)
            .unwrap();
        let dataset = &loaded.dataset;
        assert_eq!(dataset.num_days(), 1096);
        assert_eq!(dataset.start(), d(2000, 1, 1));
        assert_eq!(dataset.end(), d(2002, 12, 31));

        let pm25 = dataset.series(Pollutant::Pm25);
        assert_eq!(pm25.value_on(&d(2000, 1, 1)), Some(21.5));
        assert_eq!(pm25.value_on(&d(2000, 1, 2)), None);
        assert_eq!(pm25.value_on(&d(2000, 1, 3)), None);
        assert_eq!(pm25.value_on(&d(2000, 1, 4)), Some(18.0));
        assert_eq!(pm25.valid_count(), 2);
        assert_eq!(dataset.series(Pollutant::O3).valid_count(), 2);

        let summary = &loaded.summary;
        assert_eq!(summary.date_column, "date");
        assert_eq!(summary.column_for(Pollutant::Pm25), Some("PM25TMEAN2"));
        assert_eq!(summary.rows_read, 6);
        assert_eq!(summary.rows_invalid_date, 1);
        assert_eq!(summary.rows_out_of_range, 2);
        assert_eq!(summary.duplicate_dates, 0);
    }

    #[test]
    fn test_missing_date_column_is_fatal() {
        let result = DatasetLoader::new(2000, 2002).load_str("when,pm25\n2000-01-01,1.0\n");
        assert!(matches!(result, Err(LoadError::MissingDateColumn { .. })));
    }

    #[test]
    fn test_missing_required_pollutant_is_fatal() {
        let result = DatasetLoader::new(2000, 2002)
            .with_required(vec![Pollutant::No2])
            .load_str("Date,pm25,pm10,o3\n2000-01-01,1.0,2.0,0.01\n");
        match result {
            Err(LoadError::MissingPollutantColumn { pollutant, aliases }) => {
                assert_eq!(pollutant, Pollutant::No2);
                assert!(aliases.contains("no2tmean2"));
            }
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_pollutant_absent_loads_as_missing() {
        let loaded = DatasetLoader::new(2000, 2000)
            .with_required(vec![Pollutant::Pm25])
            .load_str("DATE,pm25\n2000-06-01,12.0\n")
            .unwrap();
        assert_eq!(loaded.dataset.series(Pollutant::No2).valid_count(), 0);
        assert_eq!(loaded.summary.column_for(Pollutant::No2), None);
        assert_eq!(loaded.dataset.num_days(), 366);
    }

    #[test]
    fn test_no_rows_in_range() {
        let result = DatasetLoader::new(2000, 2002).load_str("date,pm25\n1998-01-01,1.0\n");
        assert!(matches!(result, Err(LoadError::NoRowsInRange { .. })));
    }

    #[test]
    fn test_invalid_year_range() {
        let result = DatasetLoader::new(2002, 2000).load_str("date,pm25\n2000-01-01,1.0\n");
        assert!(matches!(result, Err(LoadError::InvalidYearRange { .. })));
    }

    #[test]
    fn test_duplicate_dates_are_averaged() {
        let loaded = DatasetLoader::new(2000, 2000)
            .load_str("date,pm25\n2000-01-01,10.0\n01/01/2000,20.0\n2000-01-01,\n")
            .unwrap();
        let pm25 = loaded.dataset.series(Pollutant::Pm25);
        assert_eq!(pm25.value_on(&d(2000, 1, 1)), Some(15.0));
        assert_eq!(loaded.summary.duplicate_dates, 1);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" 3.5 "), Some(3.5));
        assert_eq!(parse_value("0"), Some(0.0));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("---"), None);
        assert_eq!(parse_value("abc"), None);
    }
}
