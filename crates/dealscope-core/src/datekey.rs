//! Calendar keys for bucketing timestamps by local day and month.
//!
//! Keys wrap calendar dates rather than strings, so ordering is chronological
//! and the string form is always zero-padded.

use crate::error::ParseError;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One calendar day in the viewer's time zone, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey(self.0.with_day(1).unwrap_or(self.0))
    }

    /// The day before this one, `None` only at the calendar's lower bound.
    pub fn pred(&self) -> Option<DateKey> {
        self.0.pred_opt().map(DateKey)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields; keys must be canonical
        if s.len() != 10 {
            return Err(ParseError::DateKey(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(DateKey)
            .map_err(|_| ParseError::DateKey(s.to_string()))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One calendar month, rendered as `YYYY-MM`. Stored as the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(MonthKey)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> DateKey {
        DateKey(self.0)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for MonthKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::MonthKey(s.to_string());
        if s.len() != 7 {
            return Err(invalid());
        }
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Calendar day of `instant` as seen in `zone`.
pub fn local_date_key<Tz: TimeZone>(instant: &DateTime<Utc>, zone: &Tz) -> DateKey {
    DateKey(instant.with_timezone(zone).date_naive())
}

/// Calendar month of `instant` as seen in `zone`.
pub fn month_key<Tz: TimeZone>(instant: &DateTime<Utc>, zone: &Tz) -> MonthKey {
    local_date_key(instant, zone).month_key()
}

/// Long form, e.g. "Monday, January 5, 2025".
pub fn format_date_key(key: DateKey) -> String {
    key.0.format("%A, %B %-d, %Y").to_string()
}

/// e.g. "January 2025".
pub fn format_month_key(key: MonthKey) -> String {
    key.0.format("%B %Y").to_string()
}

/// Short form used for week sections, e.g. "Mon, Jan 5".
pub fn format_short_date(key: DateKey) -> String {
    key.0.format("%a, %b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse::<DateTime<Utc>>().unwrap()
    }

    #[test]
    fn test_local_date_key_same_day_ignores_time_of_day() {
        let morning = local_date_key(&utc("2025-01-05T00:00:00Z"), &Utc);
        let night = local_date_key(&utc("2025-01-05T23:59:59.999Z"), &Utc);
        assert_eq!(morning, night);
        assert_eq!(morning.to_string(), "2025-01-05");
    }

    #[test]
    fn test_local_date_key_respects_zone() {
        let instant = utc("2025-01-05T23:00:00Z");
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let west = FixedOffset::west_opt(5 * 3600).unwrap();

        assert_eq!(local_date_key(&instant, &Utc).to_string(), "2025-01-05");
        assert_eq!(local_date_key(&instant, &east).to_string(), "2025-01-06");
        assert_eq!(
            local_date_key(&utc("2025-01-06T03:00:00Z"), &west).to_string(),
            "2025-01-05"
        );
    }

    #[test]
    fn test_keys_are_zero_padded() {
        let instant = utc("2025-03-07T12:00:00Z");
        assert_eq!(local_date_key(&instant, &Utc).to_string(), "2025-03-07");
        assert_eq!(month_key(&instant, &Utc).to_string(), "2025-03");
    }

    #[test]
    fn test_month_key_ordering_is_chronological() {
        let feb: MonthKey = "2025-02".parse().unwrap();
        let oct: MonthKey = "2025-10".parse().unwrap();
        let dec_prev: MonthKey = "2024-12".parse().unwrap();
        assert!(feb < oct);
        assert!(dec_prev < feb);
        assert!(feb.to_string() < oct.to_string());
    }

    #[test]
    fn test_date_key_parse_rejects_non_canonical() {
        assert!("2025-1-5".parse::<DateKey>().is_err());
        assert!("2025-13-01".parse::<DateKey>().is_err());
        assert!("2025-02-30".parse::<DateKey>().is_err());
        assert!("yesterday".parse::<DateKey>().is_err());
        assert_eq!(
            "2025-01-05".parse::<DateKey>().unwrap().to_string(),
            "2025-01-05"
        );
    }

    #[test]
    fn test_month_key_parse_rejects_non_canonical() {
        assert!("2025-1".parse::<MonthKey>().is_err());
        assert!("2025-00".parse::<MonthKey>().is_err());
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("202501".parse::<MonthKey>().is_err());
        assert_eq!(MonthKey::new(2025, 1).unwrap().to_string(), "2025-01");
    }

    #[test]
    fn test_date_key_maps_to_single_month_key() {
        let first: DateKey = "2025-01-01".parse().unwrap();
        let last: DateKey = "2025-01-31".parse().unwrap();
        assert_eq!(first.month_key(), last.month_key());
        assert_eq!(first.month_key().first_day(), first);
    }

    #[test]
    fn test_format_date_key() {
        let key: DateKey = "2025-01-05".parse().unwrap();
        assert_eq!(format_date_key(key), "Sunday, January 5, 2025");
        let key: DateKey = "2025-01-06".parse().unwrap();
        assert_eq!(format_date_key(key), "Monday, January 6, 2025");
    }

    #[test]
    fn test_format_month_key() {
        assert_eq!(format_month_key("2025-01".parse().unwrap()), "January 2025");
        assert_eq!(format_month_key("2024-12".parse().unwrap()), "December 2024");
    }

    #[test]
    fn test_format_short_date() {
        let key: DateKey = "2025-01-06".parse().unwrap();
        assert_eq!(format_short_date(key), "Mon, Jan 6");
    }

    #[test]
    fn test_keys_serialize_as_strings() {
        let key: DateKey = "2025-01-05".parse().unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-01-05\"");
        let back: DateKey = serde_json::from_str("\"2025-01-05\"").unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<MonthKey>("\"2025-1\"").is_err());
    }
}
