//! Calendar dates for timeline events.

use crate::error::DatasetError;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The date of a timeline event.
///
/// Parsed leniently (`1966`, `1966-03`, `1966-03-01` or a full RFC 3339
/// timestamp); missing month/day default to the first. Always written
/// back as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimelineDate(NaiveDate);

impl TimelineDate {
    /// Returns `None` for an impossible calendar date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

}

impl FromStr for TimelineDate {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DatasetError::InvalidDate(s.to_string());

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(ts.date_naive()));
        }

        // Partial dates: "YYYY" or "YYYY-MM".
        let mut parts = s.splitn(2, '-');
        let year: i32 = parts
            .next()
            .filter(|y| !y.is_empty() && y.chars().all(|c| c.is_ascii_digit()))
            .and_then(|y| y.parse().ok())
            .ok_or_else(invalid)?;
        let month: u32 = match parts.next() {
            None => 1,
            Some(m) if m.len() <= 2 && m.chars().all(|c| c.is_ascii_digit()) => {
                m.parse().map_err(|_| invalid())?
            }
            Some(_) => return Err(invalid()),
        };

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimelineDate {
    type Error = DatasetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimelineDate> for String {
    fn from(value: TimelineDate) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for TimelineDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// An inclusive date window; a missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<TimelineDate>,
    pub end: Option<TimelineDate>,
}

impl DateRange {
    pub fn new(start: Option<TimelineDate>, end: Option<TimelineDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: TimelineDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// True when neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> TimelineDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_full_and_partial_dates() {
        assert_eq!(date("1966-03-15"), TimelineDate::from_ymd(1966, 3, 15).unwrap());
        assert_eq!(date("1966-03"), TimelineDate::from_ymd(1966, 3, 1).unwrap());
        assert_eq!(date("1966"), TimelineDate::from_ymd(1966, 1, 1).unwrap());
        assert_eq!(
            date("2023-03-14T16:00:00Z"),
            TimelineDate::from_ymd(2023, 3, 14).unwrap()
        );
    }

    #[test]
    fn test_invalid_dates() {
        assert!("".parse::<TimelineDate>().is_err());
        assert!("sometime".parse::<TimelineDate>().is_err());
        assert!("1966-13".parse::<TimelineDate>().is_err());
        assert!("1966-02-30".parse::<TimelineDate>().is_err());
    }

    #[test]
    fn test_display_is_iso() {
        assert_eq!(date("1950").to_string(), "1950-01-01");
        let json = serde_json::to_string(&date("1997-05-11")).unwrap();
        assert_eq!(json, "\"1997-05-11\"");
    }

    #[test]
    fn test_range_is_inclusive_and_open_ended() {
        let range = DateRange::new(Some(date("1950")), Some(date("1970-12-31")));
        assert!(range.contains(date("1950-01-01")));
        assert!(range.contains(date("1970-12-31")));
        assert!(!range.contains(date("1971")));

        let open_end = DateRange::new(Some(date("2000")), None);
        assert!(open_end.contains(date("2999")));
        assert!(!open_end.contains(date("1999-12-31")));
        assert!(DateRange::default().is_unbounded());
    }
}
