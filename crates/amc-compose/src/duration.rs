//! Prometheus duration syntax (`30s`, `1h30m`, `2w`, `0`).

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Units in the order they must appear, with their length in milliseconds.
const UNITS: [(&str, u64); 7] = [
    ("y", 365 * 24 * 60 * 60 * 1000),
    ("w", 7 * 24 * 60 * 60 * 1000),
    ("d", 24 * 60 * 60 * 1000),
    ("h", 60 * 60 * 1000),
    ("m", 60 * 1000),
    ("s", 1000),
    ("ms", 1),
];

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(([0-9]+)y)?(([0-9]+)w)?(([0-9]+)d)?(([0-9]+)h)?(([0-9]+)m)?(([0-9]+)s)?(([0-9]+)ms)?$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// The string is not a Prometheus duration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid duration string: {0:?}")]
pub struct InvalidDuration(pub String);

/// Parses a Prometheus duration.
///
/// Units must appear in decreasing order and at most once each. The bare
/// string `"0"` is accepted; the empty string is not.
pub fn parse_duration(input: &str) -> Result<Duration, InvalidDuration> {
    let invalid = || InvalidDuration(input.to_string());

    match input {
        "" => return Err(invalid()),
        "0" => return Ok(Duration::ZERO),
        _ => {}
    }

    let captures = DURATION_REGEX.captures(input).ok_or_else(invalid)?;

    let mut millis: u64 = 0;
    for (i, (_, unit_ms)) in UNITS.iter().enumerate() {
        // Group 2, 4, 6, ... hold the digits of each unit.
        let Some(digits) = captures.get(2 * i + 2) else {
            continue;
        };
        let value: u64 = digits.as_str().parse().map_err(|_| invalid())?;
        millis = value
            .checked_mul(*unit_ms)
            .and_then(|v| millis.checked_add(v))
            .ok_or_else(invalid)?;
    }

    Ok(Duration::from_millis(millis))
}
