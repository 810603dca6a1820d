//! Timestamp reading for gamelog headers and entries.
//!
//! Every timestamp in a gamelog uses the fixed-width form
//! `YYYY.MM.DD HH:MM:SS` and is always UTC. The [`TIMESTAMP_PATTERN`]
//! fragment is embedded in the header and entry patterns; its named groups
//! are read back by [`timestamp_from_captures`].
//!
//! # Example
//!
//! ```
//! use gamelog_parser::timestamp::{format_timestamp, parse_timestamp};
//!
//! let ts = parse_timestamp("2010.06.21 19:04:33").unwrap();
//! assert_eq!(format_timestamp(&ts), "2010.06.21 19:04:33");
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::{Captures, Regex};

use crate::error::{ParserError, Result};

/// A UTC instant with second resolution.
pub type Timestamp = DateTime<Utc>;

/// Regex fragment matching `YYYY.MM.DD HH:MM:SS` with named groups
/// `year`, `month`, `day`, `hour`, `min` and `sec`.
pub const TIMESTAMP_PATTERN: &str = r"(?P<year>\d{4})\.(?P<month>\d{2})\.(?P<day>\d{2}) (?P<hour>\d{2}):(?P<min>\d{2}):(?P<sec>\d{2})";

/// The output format matching the log's own timestamp layout.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{TIMESTAMP_PATTERN}$")).unwrap());

/// Builds a UTC timestamp from the six calendar fields.
///
/// # Errors
///
/// Returns `ParserError::TimestampRange` if any field is outside its
/// calendar range (month 13, February 30th, hour 24, ...).
pub fn timestamp_from_fields(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<Timestamp> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParserError::TimestampRange {
            value: format!("{year:04}.{month:02}.{day:02} {hour:02}:{minute:02}:{second:02}"),
        })
}

/// Reads a timestamp out of a match of a pattern containing
/// [`TIMESTAMP_PATTERN`].
///
/// # Errors
///
/// Returns `ParserError::TimestampRange` if the captured fields do not form
/// a valid calendar date and time.
pub fn timestamp_from_captures(caps: &Captures<'_>) -> Result<Timestamp> {
    // The pattern guarantees ASCII digits of fixed width, so these cannot fail.
    let field = |name: &str| -> u32 {
        caps.name(name)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or_default()
    };

    #[allow(clippy::cast_possible_wrap)]
    let year = field("year") as i32;

    timestamp_from_fields(
        year,
        field("month"),
        field("day"),
        field("hour"),
        field("min"),
        field("sec"),
    )
}

/// Parses a standalone `YYYY.MM.DD HH:MM:SS` string.
///
/// # Errors
///
/// - `ParserError::TimestampRange` if the string does not have the expected
///   layout or its fields are out of range
pub fn parse_timestamp(text: &str) -> Result<Timestamp> {
    let caps = TIMESTAMP_RE
        .captures(text)
        .ok_or_else(|| ParserError::TimestampRange {
            value: text.to_string(),
        })?;
    timestamp_from_captures(&caps)
}

/// Formats a timestamp back into the log's `YYYY.MM.DD HH:MM:SS` layout.
#[must_use]
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Offset, Timelike};

    #[test]
    fn test_parse_timestamp_fields() {
        let ts = parse_timestamp("2010.06.21 19:04:33").unwrap();
        assert_eq!(ts.year(), 2010);
        assert_eq!(ts.month(), 6);
        assert_eq!(ts.day(), 21);
        assert_eq!(ts.hour(), 19);
        assert_eq!(ts.minute(), 4);
        assert_eq!(ts.second(), 33);
        assert_eq!(ts.offset().fix().local_minus_utc(), 0);
    }

    #[test]
    fn test_format_round_trip() {
        for text in [
            "2010.06.21 19:04:33",
            "2009.12.31 23:59:59",
            "2012.02.29 00:00:00",
            "1999.01.01 12:30:05",
        ] {
            let ts = parse_timestamp(text).unwrap();
            assert_eq!(format_timestamp(&ts), text);
        }
    }

    #[test]
    fn test_out_of_range_fields() {
        for text in [
            "2010.13.01 00:00:00",
            "2010.02.30 00:00:00",
            "2011.02.29 00:00:00",
            "2010.01.01 24:00:00",
            "2010.01.01 00:60:00",
            "2010.00.10 00:00:00",
        ] {
            let err = parse_timestamp(text).unwrap_err();
            match err {
                ParserError::TimestampRange { value } => assert_eq!(value, text),
                other => panic!("Expected TimestampRange for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_wrong_layout() {
        assert!(parse_timestamp("2010-06-21 19:04:33").is_err());
        assert!(parse_timestamp("2010.6.21 19:04:33").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_timestamp_from_fields() {
        let ts = timestamp_from_fields(2010, 6, 21, 19, 4, 33).unwrap();
        assert_eq!(format_timestamp(&ts), "2010.06.21 19:04:33");
        assert!(timestamp_from_fields(2010, 6, 31, 0, 0, 0).is_err());
    }

    #[test]
    fn test_captures_inside_larger_pattern() {
        let re = Regex::new(&format!(r"^\[ {TIMESTAMP_PATTERN} \]")).unwrap();
        let caps = re.captures("[ 2011.03.04 05:06:07 ] (info) x").unwrap();
        let ts = timestamp_from_captures(&caps).unwrap();
        assert_eq!(format_timestamp(&ts), "2011.03.04 05:06:07");
    }
}
