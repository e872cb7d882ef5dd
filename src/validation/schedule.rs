use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

// Weekday names are stripped before parsing, so none of these carry one.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
    "%b %d %Y %H:%M:%S GMT%z",
    "%B %d, %Y %H:%M:%S %z",
];

static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-1]?[0-9]|2[0-3]):([0-5][0-9])(?::([0-5][0-9]))?$").expect("valid time regex")
});

static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("valid weekday regex")
});

// `Date.toString()` appends the zone name in parentheses.
static ZONE_NAME_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\)$").expect("valid zone name regex"));

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}$").expect("valid year-month regex"));

static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year regex"));

/// Canonicalises a calendar date to `YYYY-MM-DD`.
///
/// Timestamps carrying an offset are converted to UTC before the date is
/// taken; plain calendar dates are used as written. A leading weekday name
/// is ignored, a bare year or year-month means the first day of it.
pub fn normalize_date(raw: &str) -> Result<String, ValidationError> {
    parse_date(raw.trim())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ValidationError::new("date", "date must be a valid date string"))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let without_zone_name = ZONE_NAME_SUFFIX.replace(raw, "");
    let without_weekday = WEEKDAY_PREFIX.replace(without_zone_name.trim(), "");
    let input = without_weekday.trim();

    if input.is_empty() {
        return None;
    }

    if YEAR_ONLY.is_match(input) {
        return NaiveDate::parse_from_str(&format!("{}-01-01", input), "%Y-%m-%d").ok();
    }
    if YEAR_MONTH.is_match(input) {
        return NaiveDate::parse_from_str(&format!("{}-01", input), "%Y-%m-%d").ok();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    let zoned = zulu_as_offset(input);
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&zoned, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Rewrites a trailing `Z` after a digit as `+00:00`.
fn zulu_as_offset(input: &str) -> Cow<'_, str> {
    let rest = match input.strip_suffix('Z').or_else(|| input.strip_suffix('z')) {
        Some(rest) => rest,
        None => return Cow::Borrowed(input),
    };

    if rest.ends_with(|c: char| c.is_ascii_digit()) {
        Cow::Owned(format!("{}+00:00", rest))
    } else {
        Cow::Borrowed(input)
    }
}

/// Canonicalises `H:MM`, `HH:MM` or `HH:MM:SS` (24-hour) to `HH:MM`.
/// Seconds are discarded.
pub fn normalize_time(raw: &str) -> Result<String, ValidationError> {
    let caps = TIME_PATTERN
        .captures(raw.trim())
        .ok_or_else(|| ValidationError::new("time", "time must be in HH:MM or HH:MM:SS format"))?;

    Ok(format!("{:0>2}:{}", &caps[1], &caps[2]))
}
