//! Shared utility functions for AQA crates.

/// Date utility functions
pub mod dates {
    use chrono::{Datelike, NaiveDate, NaiveDateTime};

    /// Plain date layouts accepted in source files, tried in order.
    pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

    /// Date-time layouts accepted in source files; the time part is dropped.
    pub const DATETIME_FORMATS: [&str; 3] =
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    /// Abbreviated month names, January first.
    pub const MONTH_ABBREVIATIONS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date in any of the accepted layouts.
    ///
    /// Returns `None` when nothing matches, mirroring a coerce-to-missing parse.
    pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                    .map(|dt| dt.date())
            })
    }

    /// First day of the given year.
    pub fn first_day_of_year(year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, 1, 1)
    }

    /// Last day of the given year.
    pub fn last_day_of_year(year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, 12, 31)
    }

    /// First day of the month containing `date`.
    pub fn first_of_month(date: &NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(*date)
    }

    /// Abbreviated month name for a 1-based month number.
    pub fn month_abbreviation(month: u32) -> &'static str {
        match month {
            1..=12 => MONTH_ABBREVIATIONS[(month - 1) as usize],
            _ => "???",
        }
    }

}

/// Numeric helpers
pub mod numbers {
    /// Round half away from zero to a fixed number of decimals.
    pub fn round_to(value: f64, decimals: i32) -> f64 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    }

    /// Format an optional value, using `no data` for the missing case.
    pub fn format_or_no_data(value: Option<f64>, decimals: usize) -> String {
        match value {
            Some(v) => format!("{:.*}", decimals, v),
            None => String::from("no data"),
        }
    }

}
