//! Lenient parsing of the date formats found in hand-maintained finance spreadsheets.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Which component comes first in an ambiguous slash date like `03/02/2025`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `DD/MM/YYYY`, as written in Brazil and most of Europe.
    #[default]
    DayFirst,
    /// `MM/DD/YYYY`, as written in the US.
    MonthFirst,
}

serde_plain::derive_display_from_serialize!(DateOrder);
serde_plain::derive_fromstr_from_deserialize!(DateOrder);

/// How much of a calendar date the input actually specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Day,
    /// Only a month and year were given, e.g. `03/2025`. The date is the first of the month.
    Month,
}

/// A date value as it arrives from a data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Date(NaiveDate),
    Text(String),
}

impl DateValue {
    /// Resolves the value to a calendar date, or `None` if the text is not a date we understand.
    pub fn resolve(&self, order: DateOrder) -> Option<NaiveDate> {
        match self {
            DateValue::Date(d) => Some(*d),
            DateValue::Text(s) => parse_date(s, order).map(|(d, _)| d),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(value: NaiveDate) -> Self {
        DateValue::Date(value)
    }
}

impl From<&str> for DateValue {
    fn from(value: &str) -> Self {
        DateValue::Text(value.to_string())
    }
}

impl From<String> for DateValue {
    fn from(value: String) -> Self {
        DateValue::Text(value)
    }
}

const DAY_FIRST: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DAY_FIRST_SHORT: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];
const MONTH_FIRST: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];
const MONTH_FIRST_SHORT: &[&str] = &["%m/%d/%y", "%m-%d-%y", "%m.%d.%y"];
const DATE_TIMES: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses `s` into a date and reports whether it was a full date or month-precision.
///
/// Accepts ISO dates (with or without a trailing time), slash/dash/dot dates in the given `order`
/// with four or two digit years, and `MM/YYYY` or `YYYY-MM`, which resolve to the first of the
/// month.
pub fn parse_date(s: &str, order: DateOrder) -> Option<(NaiveDate, Precision)> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Without this, `05-01-25` would be read as the ISO date 0005-01-25.
    let year_leads = s.split('-').next().map(str::len) == Some(4);
    if year_leads {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some((d, Precision::Day));
        }
        for fmt in DATE_TIMES {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some((dt.date(), Precision::Day));
            }
        }
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
            return Some((dt.date_naive(), Precision::Day));
        }
    }

    // `%Y` would read `25` as the year 25, so pick the formats by the width of the year.
    let year_width = s
        .rsplit(|c| matches!(c, '/' | '-' | '.'))
        .next()
        .map(str::len);
    let formats: &[&str] = match (order, year_width) {
        (DateOrder::DayFirst, Some(2)) => DAY_FIRST_SHORT,
        (DateOrder::DayFirst, _) => DAY_FIRST,
        (DateOrder::MonthFirst, Some(2)) => MONTH_FIRST_SHORT,
        (DateOrder::MonthFirst, _) => MONTH_FIRST,
    };
    for fmt in formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some((d, Precision::Day));
        }
    }

    parse_month(s).map(|d| (d, Precision::Month))
}

/// Parses `MM/YYYY` or `YYYY-MM` into the first day of that month.
fn parse_month(s: &str) -> Option<NaiveDate> {
    let (year, month) = if let Some((m, y)) = s.split_once('/') {
        (y, m)
    } else if let Some((y, m)) = s.split_once('-') {
        (y, m)
    } else {
        return None;
    };
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// The last day of the month that `date` falls in.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// Formats a date the way the dashboards display it: `DD/MM/YYYY` or `MM/DD/YYYY`.
pub fn format_date(date: NaiveDate, order: DateOrder) -> String {
    match order {
        DateOrder::DayFirst => date.format("%d/%m/%Y").to_string(),
        DateOrder::MonthFirst => date.format("%m/%d/%Y").to_string(),
    }
}

/// Formats the month of a date as `MM/YYYY`.
pub fn format_month(date: NaiveDate) -> String {
    date.format("%m/%Y").to_string()
}
