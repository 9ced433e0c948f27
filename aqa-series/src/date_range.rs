use aqa_utils::dates::{first_day_of_year, last_day_of_year};
use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use std::mem::replace;

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug, Serialize)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// Calendar covering January 1 of `start_year` through December 31 of `end_year`.
    pub fn for_years(start_year: i32, end_year: i32) -> Option<DateRange> {
        if start_year > end_year {
            return None;
        }
        Some(DateRange(
            first_day_of_year(start_year)?,
            last_day_of_year(end_year)?,
        ))
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.1
    }

    /// Number of days covered, counting both endpoints.
    pub fn num_days(&self) -> usize {
        if self.0 > self.1 {
            0
        } else {
            ((self.1 - self.0).num_days() + 1) as usize
        }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.0 <= *date && *date <= self.1
    }

    /// Zero-based day offset of `date` from the start of the range.
    pub fn offset_of(&self, date: &NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((*date - self.0).num_days() as usize)
        } else {
            None
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0 + TimeDelta::days(1);
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_date_range_iteration() {
        let start = NaiveDate::from_ymd_opt(2000, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2000, 3, 2).unwrap();
        let range = DateRange(start, end);
        let dates: Vec<NaiveDate> = range.collect();
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[0], start);
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2000, 2, 29).unwrap());
        assert_eq!(dates[4], end);
    }

    #[test]
    fn test_date_range_single_day() {
        let start = NaiveDate::from_ymd_opt(2001, 3, 15).unwrap();
        let range = DateRange(start, start);
        assert_eq!(range.num_days(), 1);
        let dates: Vec<NaiveDate> = range.collect();
        assert_eq!(dates, vec![start]);
    }

    #[test]
    fn test_date_range_empty() {
        let start = NaiveDate::from_ymd_opt(2001, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2001, 3, 14).unwrap();
        let range = DateRange(start, end);
        assert_eq!(range.num_days(), 0);
        assert_eq!(range.count(), 0);
    }

    #[test]
    fn test_for_years_spans_leap_year() {
        let range = DateRange::for_years(2000, 2002).unwrap();
        assert_eq!(range.num_days(), 1096);
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!(range.end(), NaiveDate::from_ymd_opt(2002, 12, 31).unwrap());
        assert!(DateRange::for_years(2003, 2002).is_none());
    }

    #[test]
    fn test_offset_of() {
        let range = DateRange::for_years(2000, 2000).unwrap();
        let d = NaiveDate::from_ymd_opt(2000, 2, 1).unwrap();
        assert_eq!(range.offset_of(&d), Some(31));
        let outside = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert_eq!(range.offset_of(&outside), None);
    }
}
