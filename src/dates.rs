//! Date scanning over free note text.
//!
//! Five numeric layouts are recognized. Every recognizer needs a non-digit
//! right after the date so that `12/05/20245` is not read as a date.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Clone, Copy)]
enum Layout {
    MonthDayYear,
    YearMonthDay,
}

const RECOGNIZERS: &[(&str, Layout)] = &[
    (r"([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{4})[^0-9]", Layout::MonthDayYear),
    (r"([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{2})[^0-9]", Layout::MonthDayYear),
    (r"([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})[^0-9]", Layout::MonthDayYear),
    (r"([0-9]{1,2})/([0-9]{1,2})/([0-9]{2})[^0-9]", Layout::MonthDayYear),
    (r"([0-9]{4})-([0-9]{2})-([0-9]{2})[^0-9]", Layout::YearMonthDay),
];

fn recognizers() -> &'static [(Regex, Layout)] {
    static COMPILED: OnceLock<Vec<(Regex, Layout)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RECOGNIZERS
            .iter()
            .filter_map(|(pattern, layout)| {
                Regex::new(pattern).ok().map(|re| (re, *layout))
            })
            .collect()
    })
}

/// Oldest date accepted (inclusive).
fn earliest() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Newest date bound (exclusive).
fn latest() -> NaiveDate {
    NaiveDate::from_ymd_opt(2049, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Two-digit years follow the POSIX `%y` pivot.
fn expand_year(digits: &str, value: i32) -> i32 {
    if digits.len() != 2 {
        value
    } else if value < 69 {
        2000 + value
    } else {
        1900 + value
    }
}

fn to_date(caps: &regex::Captures<'_>, layout: Layout) -> Option<NaiveDate> {
    let field = |i: usize| caps.get(i).map(|m| m.as_str());
    let (y, m, d) = match layout {
        Layout::MonthDayYear => (field(3)?, field(1)?, field(2)?),
        Layout::YearMonthDay => (field(1)?, field(2)?, field(3)?),
    };
    let year = expand_year(y, y.parse().ok()?);
    NaiveDate::from_ymd_opt(year, m.parse().ok()?, d.parse().ok()?)
}

/// All plausible dates in `text`, deduplicated and sorted ascending.
pub fn find_dates(text: &str) -> Vec<NaiveDate> {
    let (lo, hi) = (earliest(), latest());
    let mut found = BTreeSet::new();
    for (re, layout) in recognizers() {
        for caps in re.captures_iter(text) {
            match to_date(&caps, *layout) {
                Some(date) if date >= lo && date < hi => {
                    found.insert(date);
                }
                _ => {}
            }
        }
    }
    found.into_iter().collect()
}

/// The earliest date in `text`.
pub fn first_date(text: &str) -> Result<NaiveDate> {
    find_dates(text)
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound("no date in text".into()))
}

/// Keep files whose first date (file name included) falls in `year`,
/// ordered by that date.
pub fn limit_to_year(year: i32, files: &[PathBuf]) -> Vec<PathBuf> {
    let mut dated: Vec<(NaiveDate, PathBuf)> = files
        .iter()
        .filter_map(|path| {
            let date = first_date(&searchable_text(path)).ok()?;
            (date.year() == year).then(|| (date, path.clone()))
        })
        .collect();
    dated.sort_by(|a, b| a.0.cmp(&b.0));
    dated.into_iter().map(|(_, p)| p).collect()
}

/// File name followed by content, so dates in names count too.
fn searchable_text(path: &Path) -> String {
    let content = fs::read_to_string(path).unwrap_or_default();
    format!("{} {}", path.display(), content)
}

/// Render with a strftime pattern; an invalid pattern falls back to ISO.
pub fn format_date(date: NaiveDate, fmt: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(fmt)).is_err() {
        tracing::warn!(format = %fmt, "invalid date format");
        return date.to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day_in_two_layouts() {
        let dates = find_dates("meeting 2024-03-05 and 03/05/24 notes");
        assert_eq!(dates, vec![ymd(2024, 3, 5)]);
    }

    #[test]
    fn test_sorted_and_distinct() {
        let dates = find_dates("due 12.1.2023, started 2021-06-30. again 6/30/21\n");
        assert_eq!(dates, vec![ymd(2021, 6, 30), ymd(2023, 12, 1)]);
    }

    #[test]
    fn test_garbage_is_empty() {
        assert!(find_dates("invoice 99.99.9999!").is_empty());
        assert!(find_dates("").is_empty());
        assert!(find_dates("13/45/2020 and 2020-02-30 ").is_empty());
    }

    #[test]
    fn test_needs_trailing_delimiter() {
        assert!(find_dates("2024-03-05").is_empty());
        assert!(find_dates("2024-03-055 ").is_empty());
        assert_eq!(find_dates("2024-03-05\n"), vec![ymd(2024, 3, 5)]);
    }

    #[test]
    fn test_plausibility_window() {
        assert_eq!(find_dates("2010-01-01 "), vec![ymd(2010, 1, 1)]);
        assert!(find_dates("2009-12-31 ").is_empty());
        assert!(find_dates("2049-12-31 ").is_empty());
        assert!(find_dates("1/1/99 ").is_empty());
    }

    #[test]
    fn test_first_date() {
        assert_eq!(first_date("b 3/4/2022 a 1/2/2022 ").unwrap(), ymd(2022, 1, 2));
        assert!(matches!(first_date("no dates"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_limit_to_year() {
        let tmp = tempdir().unwrap();
        let late = tmp.path().join("late.txt");
        let early = tmp.path().join("early.txt");
        let other = tmp.path().join("other.txt");
        let named = tmp.path().join("2023-01-09-standup.txt");
        fs::write(&late, "on 11/02/2023 we met\n").unwrap();
        fs::write(&early, "kickoff 2023-02-01\n").unwrap();
        fs::write(&other, "kickoff 2019-02-01\n").unwrap();
        fs::write(&named, "no date inside\n").unwrap();
        let files = vec![late.clone(), other, early.clone(), named.clone()];
        assert_eq!(limit_to_year(2023, &files), vec![named, early, late]);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(ymd(2024, 3, 5), "%Y-%m-%d"), "2024-03-05");
        assert_eq!(format_date(ymd(2024, 3, 5), "%d %b"), "05 Mar");
        assert_eq!(format_date(ymd(2024, 3, 5), "%Q"), "2024-03-05");
    }
}
