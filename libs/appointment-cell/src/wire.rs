//! The backend's short date format, `YY-MM-DD`.
//!
//! Availability dates travel with a two-digit year; everything inside the
//! portal works on full `NaiveDate`s. This is the only place the two meet.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireDateError {
    #[error("expected YY-MM-DD, got {0:?}")]
    Format(String),

    #[error("{0:?} is not a calendar date")]
    OutOfRange(String),
}

/// Encodes as `YY-MM-DD`, the year taken modulo 100.
pub fn to_wire_date(date: NaiveDate) -> String {
    format!(
        "{:02}-{:02}-{:02}",
        date.year().rem_euclid(100),
        date.month(),
        date.day()
    )
}

/// Decodes `YY-MM-DD` as a date in 2000-2099.
pub fn parse_wire_date(value: &str) -> Result<NaiveDate, WireDateError> {
    let format_error = || WireDateError::Format(value.to_string());

    let parts: Vec<&str> = value.trim().split('-').collect();
    let &[yy, mm, dd] = parts.as_slice() else {
        return Err(format_error());
    };

    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if yy.len() != 2 || !all_digits(yy) || mm.len() > 2 || !all_digits(mm) || dd.len() > 2 || !all_digits(dd) {
        return Err(format_error());
    }

    let year: i32 = format!("20{}", yy).parse().map_err(|_| format_error())?;
    let month: u32 = mm.parse().map_err(|_| format_error())?;
    let day: u32 = dd.parse().map_err(|_| format_error())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| WireDateError::OutOfRange(value.to_string()))
}

/// Serde adapter for fields carried as `YY-MM-DD`.
pub mod serde_wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_wire_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_wire_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_encode_pads_each_part() {
        assert_eq!(to_wire_date(date(2025, 6, 15)), "25-06-15");
        assert_eq!(to_wire_date(date(2003, 1, 2)), "03-01-02");
    }

    #[test]
    fn test_decode_prefixes_century() {
        assert_eq!(parse_wire_date("25-06-15").unwrap(), date(2025, 6, 15));
        assert_eq!(parse_wire_date("99-12-31").unwrap(), date(2099, 12, 31));
        assert_eq!(parse_wire_date("00-1-5").unwrap(), date(2000, 1, 5));
    }

    #[test]
    fn test_round_trip_across_the_century() {
        let mut day = date(2000, 1, 1);
        let end = date(2099, 12, 31);
        while day <= end {
            assert_eq!(parse_wire_date(&to_wire_date(day)).unwrap(), day);
            day = day + chrono::Duration::days(17);
        }
        assert_eq!(parse_wire_date(&to_wire_date(end)).unwrap(), end);
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert_matches!(parse_wire_date("2025-06-15"), Err(WireDateError::Format(_)));
        assert_matches!(parse_wire_date("25/06/15"), Err(WireDateError::Format(_)));
        assert_matches!(parse_wire_date("25-06"), Err(WireDateError::Format(_)));
        assert_matches!(parse_wire_date("ab-06-15"), Err(WireDateError::Format(_)));
        assert_matches!(parse_wire_date("25-02-30"), Err(WireDateError::OutOfRange(_)));
        assert_matches!(parse_wire_date("25-13-01"), Err(WireDateError::OutOfRange(_)));
    }
}
