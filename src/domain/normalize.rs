//! Parsing of raw text fields into canonical typed values.

use super::amount::{Amount, AmountError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
    #[error("malformed amount {input:?}: {source}")]
    MalformedAmount {
        input: String,
        #[source]
        source: AmountError,
    },
}

// `%#z` accepts `+03`, `+0300` and `+03:00`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Parse an ISO-8601-like timestamp into a UTC instant.
///
/// A trailing `Z`/`z` is read as `+00:00`. Explicit offsets are converted to UTC.
/// Timestamps without any offset are taken to already be in UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let trimmed = text.trim();
    let owned;
    let s = match trimmed.strip_suffix(&['Z', 'z'][..]) {
        Some(head) => {
            owned = format!("{}+00:00", head);
            owned.as_str()
        }
        None => trimmed,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    Err(NormalizeError::MalformedTimestamp(text.to_string()))
}

/// Parse a money amount.
///
/// All whitespace is removed and a comma is read as the decimal separator, so
/// `"1 234,50"` parses to `1234.50`.
pub fn parse_amount(text: &str) -> Result<Amount, NormalizeError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    Amount::from_str_canonical(&cleaned).map_err(|source| NormalizeError::MalformedAmount {
        input: text.to_string(),
        source,
    })
}
