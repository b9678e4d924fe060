//! Time interval parsing and conversion.
//!
//! Ranges are written `begin:end` or as a single value. Each range is parsed
//! into a [`ParsedRange`], checked, and written back in the canonical form
//! Alertmanager itself emits: lowercase day and month names, `HH:MM` times.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::alertmanager as am;
use crate::error::{ComposeError, FieldPath, Result, ValidationError};
use crate::routes::namespaced_name;
use crate::tenant::{DayOfMonthRange, TenantKey, TimeInterval, TimePeriod, TimeRange};

const WEEKDAYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:[01][0-9]|2[0-3]):[0-5][0-9]|24:00)$").unwrap_or_else(|_| unreachable!())
});

/// An inclusive range of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRange {
    /// First value.
    pub start: i32,
    /// Last value.
    pub end: i32,
}

impl ParsedRange {
    const fn single(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for ParsedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

fn split_range(raw: &str) -> Option<(&str, &str)> {
    match raw.split(':').collect::<Vec<_>>().as_slice() {
        [single] => Some((*single, *single)),
        [start, end] => Some((*start, *end)),
        _ => None,
    }
}

fn parse_range(raw: &str, what: &str, parse: impl Fn(&str) -> Option<i32>) -> std::result::Result<ParsedRange, String> {
    let (first, last) = split_range(raw).ok_or_else(|| format!("invalid {what} range {raw:?}"))?;
    let start = parse(first).ok_or_else(|| format!("{first:?} is not a valid {what}"))?;
    let end = parse(last).ok_or_else(|| format!("{last:?} is not a valid {what}"))?;
    if end < start {
        return Err(format!("{what} range {raw:?}: end is before start"));
    }
    Ok(ParsedRange { start, end })
}

fn position(names: &[&str], raw: &str) -> Option<i32> {
    names
        .iter()
        .position(|name| name.eq_ignore_ascii_case(raw))
        .and_then(|i| i32::try_from(i).ok())
}

fn name_of<'a>(names: &[&'a str], index: i32) -> &'a str {
    usize::try_from(index)
        .ok()
        .and_then(|i| names.get(i).copied())
        .unwrap_or_default()
}

/// Parses a weekday range such as `monday:friday`; Sunday is day 0.
pub fn parse_weekday_range(raw: &str) -> std::result::Result<ParsedRange, String> {
    parse_range(raw, "weekday", |s| position(&WEEKDAYS, s))
}

/// Parses a month range by name or number, e.g. `january:march` or `1:3`.
pub fn parse_month_range(raw: &str) -> std::result::Result<ParsedRange, String> {
    parse_range(raw, "month", |s| {
        position(&MONTHS, s)
            .map(|i| i + 1)
            .or_else(|| s.parse::<i32>().ok().filter(|m| (1..=12).contains(m)))
    })
}

/// Parses a year range such as `2030:2050`.
pub fn parse_year_range(raw: &str) -> std::result::Result<ParsedRange, String> {
    parse_range(raw, "year", |s| {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse::<i32>().ok()
    })
}

fn parse_time_of_day(raw: &str) -> Option<i32> {
    if !TIME_OF_DAY.is_match(raw) {
        return None;
    }
    let (hours, minutes) = raw.split_once(':')?;
    Some(hours.parse::<i32>().ok()? * 60 + minutes.parse::<i32>().ok()?)
}

/// Parses a range of the day into minutes since midnight.
///
/// The start must come strictly before the end; `24:00` is allowed as end.
pub fn parse_time_range(range: &TimeRange) -> std::result::Result<ParsedRange, String> {
    let start = parse_time_of_day(&range.start_time)
        .ok_or_else(|| format!("invalid start time {:?}", range.start_time))?;
    let end = parse_time_of_day(&range.end_time)
        .ok_or_else(|| format!("invalid end time {:?}", range.end_time))?;
    if start >= end {
        return Err(format!(
            "start time {:?} must be before end time {:?}",
            range.start_time, range.end_time
        ));
    }
    Ok(ParsedRange { start, end })
}

/// Checks a day of month range.
///
/// Days run from 1 to 31, or from -31 to -1 counting back from the end of
/// the month; both bounds must be on the same side.
pub fn check_day_of_month_range(range: &DayOfMonthRange) -> std::result::Result<ParsedRange, String> {
    let DayOfMonthRange { start, end } = *range;
    if start == 0 || end == 0 {
        return Err(format!("day of month range {start}:{end}: days start at 1"));
    }
    if !(-31..=31).contains(&start) || !(-31..=31).contains(&end) {
        return Err(format!("day of month range {start}:{end}: days must be between -31 and 31"));
    }
    if (start < 0) != (end < 0) {
        return Err(format!("day of month range {start}:{end}: start and end must have the same sign"));
    }
    if end < start {
        return Err(format!("day of month range {start}:{end}: end is before start"));
    }
    Ok(ParsedRange { start, end })
}

fn format_minutes(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn format_named(names: &[&str], range: ParsedRange, offset: i32) -> String {
    let start = name_of(names, range.start - offset);
    if range.single() {
        start.to_string()
    } else {
        format!("{start}:{}", name_of(names, range.end - offset))
    }
}

fn convert_list<T>(
    items: &[T],
    path: &FieldPath,
    convert: impl Fn(&T) -> std::result::Result<String, String>,
) -> std::result::Result<Vec<String>, ValidationError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| convert(item).map_err(|reason| ValidationError::new(&path.index(i), reason)))
        .collect()
}

/// Checks a time period and converts it to the upstream form.
pub fn convert_time_period(period: &TimePeriod, path: &FieldPath) -> std::result::Result<am::TimePeriod, ValidationError> {
    let times_path = path.field("times");
    let times = period
        .times
        .iter()
        .enumerate()
        .map(|(i, range)| {
            parse_time_range(range)
                .map(|parsed| am::TimeRange {
                    start_time: format_minutes(parsed.start),
                    end_time: format_minutes(parsed.end),
                })
                .map_err(|reason| ValidationError::new(&times_path.index(i), reason))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(am::TimePeriod {
        times,
        weekdays: convert_list(&period.weekdays, &path.field("weekdays"), |raw| {
            parse_weekday_range(raw).map(|r| format_named(&WEEKDAYS, r, 0))
        })?,
        days_of_month: convert_list(&period.days_of_month, &path.field("daysOfMonth"), |range| {
            check_day_of_month_range(range).map(|r| r.to_string())
        })?,
        months: convert_list(&period.months, &path.field("months"), |raw| {
            parse_month_range(raw).map(|r| format_named(&MONTHS, r, 1))
        })?,
        years: convert_list(&period.years, &path.field("years"), |raw| {
            parse_year_range(raw).map(|r| r.to_string())
        })?,
        extra: am::Extra::new(),
    })
}

/// Checks a tenant time interval found at `path`.
pub fn check_time_interval(interval: &TimeInterval, path: &FieldPath) -> std::result::Result<am::TimeInterval, ValidationError> {
    if interval.name.is_empty() {
        return Err(ValidationError::new(&path.field("name"), "time interval name is required"));
    }
    let periods = path.field("timeIntervals");
    let time_intervals = interval
        .time_intervals
        .iter()
        .enumerate()
        .map(|(i, period)| convert_time_period(period, &periods.index(i)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(am::TimeInterval {
        name: interval.name.clone(),
        time_intervals,
        extra: am::Extra::new(),
    })
}

/// Converts a tenant time interval, prefixing its name with the tenant identity.
pub fn convert_time_interval(
    interval: &TimeInterval,
    tenant: &TenantKey,
    path: &FieldPath,
) -> Result<am::TimeInterval> {
    let mut out = check_time_interval(interval, path).map_err(|source| ComposeError::InvalidTimeInterval {
        tenant: tenant.clone(),
        source,
    })?;
    out.name = namespaced_name(tenant, &interval.name);
    Ok(out)
}
