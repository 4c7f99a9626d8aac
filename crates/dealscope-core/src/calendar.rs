//! "Now"-anchored calendar operations.
//!
//! Everything that depends on the current date goes through a [`Calendar`],
//! which binds a time zone and a reference instant. Production code builds
//! one with [`Calendar::local`]; tests pin both.

use crate::datekey::{format_short_date, local_date_key, DateKey};
use crate::error::ParseError;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trailing windows that are pre-populated day by day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Today and the six days before it.
    Week,
    /// The 1st of the current month through today.
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            _ => Err(ParseError::Period(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    zone: Tz,
    now: DateTime<Utc>,
}

impl Calendar<Local> {
    /// System time zone, current wall-clock instant.
    pub fn local() -> Self {
        Self::at(Local, Utc::now())
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub fn at(zone: Tz, now: DateTime<Utc>) -> Self {
        Self { zone, now }
    }

    pub fn zone(&self) -> &Tz {
        &self.zone
    }

    pub fn date_key(&self, instant: &DateTime<Utc>) -> DateKey {
        local_date_key(instant, &self.zone)
    }

    pub fn today(&self) -> DateKey {
        self.date_key(&self.now)
    }

    pub fn yesterday(&self) -> Option<DateKey> {
        self.today().pred()
    }

    pub fn is_today(&self, key: DateKey) -> bool {
        key == self.today()
    }

    pub fn is_yesterday(&self, key: DateKey) -> bool {
        self.yesterday() == Some(key)
    }

    /// "Today", "Yesterday", or a short weekday label such as "Mon, Jan 5".
    pub fn format_day_of_week(&self, key: DateKey) -> String {
        if self.is_today(key) {
            "Today".to_string()
        } else if self.is_yesterday(key) {
            "Yesterday".to_string()
        } else {
            format_short_date(key)
        }
    }

    /// Day keys of `period`, today first, in descending order.
    ///
    /// The week window always has 7 entries; the month window has as many
    /// entries as today's day-of-month.
    pub fn dates_for_period(&self, period: Period) -> Vec<DateKey> {
        let today = self.today();
        let len = match period {
            Period::Week => 7,
            Period::Month => today.day() as usize,
        };
        std::iter::successors(Some(today), DateKey::pred)
            .take(len)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse::<DateTime<Utc>>().unwrap()
    }

    fn calendar_at(s: &str) -> Calendar<Utc> {
        Calendar::at(Utc, utc(s))
    }

    fn keys(keys: &[DateKey]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_week_window_scenario() {
        let cal = calendar_at("2025-01-15T12:00:00Z");
        assert_eq!(
            keys(&cal.dates_for_period(Period::Week)),
            vec![
                "2025-01-15",
                "2025-01-14",
                "2025-01-13",
                "2025-01-12",
                "2025-01-11",
                "2025-01-10",
                "2025-01-09",
            ]
        );
    }

    #[test]
    fn test_week_window_crosses_month_and_year() {
        let cal = calendar_at("2025-01-03T08:00:00Z");
        let window = cal.dates_for_period(Period::Week);
        assert_eq!(window.len(), 7);
        assert_eq!(window[0].to_string(), "2025-01-03");
        assert_eq!(window[6].to_string(), "2024-12-28");
    }

    #[test]
    fn test_week_window_strictly_descending() {
        for now in [
            "2024-02-29T00:00:00Z",
            "2025-03-01T23:59:59Z",
            "2025-12-31T12:00:00Z",
        ] {
            let cal = calendar_at(now);
            let window = cal.dates_for_period(Period::Week);
            assert_eq!(window.len(), 7);
            assert_eq!(window[0], cal.today());
            assert!(window.windows(2).all(|w| w[0] > w[1]));
        }
    }

    #[test]
    fn test_month_window_length_is_day_of_month() {
        let cal = calendar_at("2025-01-15T12:00:00Z");
        let window = cal.dates_for_period(Period::Month);
        assert_eq!(window.len(), 15);
        assert_eq!(window.first().unwrap().to_string(), "2025-01-15");
        assert_eq!(window.last().unwrap().to_string(), "2025-01-01");
        assert!(window.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_month_window_on_first_day() {
        let cal = calendar_at("2025-03-01T10:00:00Z");
        assert_eq!(keys(&cal.dates_for_period(Period::Month)), vec!["2025-03-01"]);
    }

    #[test]
    fn test_month_window_on_last_day() {
        let cal = calendar_at("2024-02-29T10:00:00Z");
        let window = cal.dates_for_period(Period::Month);
        assert_eq!(window.len(), 29);
        assert_eq!(window.last().unwrap().to_string(), "2024-02-01");
    }

    #[test]
    fn test_today_follows_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let cal = Calendar::at(tokyo, utc("2025-01-15T20:00:00Z"));
        assert_eq!(cal.today().to_string(), "2025-01-16");
        assert_eq!(cal.dates_for_period(Period::Week)[0].to_string(), "2025-01-16");
    }

    #[test]
    fn test_is_today() {
        let cal = calendar_at("2025-01-15T23:30:00Z");
        assert!(cal.is_today("2025-01-15".parse().unwrap()));
        assert!(!cal.is_today("2025-01-14".parse().unwrap()));
        assert!(!cal.is_today("2024-01-15".parse().unwrap()));
    }

    #[test]
    fn test_format_day_of_week_labels() {
        let cal = calendar_at("2025-01-15T12:00:00Z");
        assert_eq!(cal.format_day_of_week(cal.today()), "Today");
        assert_eq!(cal.format_day_of_week(cal.yesterday().unwrap()), "Yesterday");

        let other = cal.format_day_of_week("2025-01-13".parse().unwrap());
        assert_eq!(other, "Mon, Jan 13");
        assert_ne!(other, "Today");
        assert_ne!(other, "Yesterday");
    }

    #[test]
    fn test_format_day_of_week_uses_zone_for_today() {
        // 01:00 UTC on the 16th is still the 15th in New York
        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        let cal = Calendar::at(new_york, utc("2025-01-16T01:00:00Z"));
        assert_eq!(cal.format_day_of_week("2025-01-15".parse().unwrap()), "Today");
        assert_eq!(cal.format_day_of_week("2025-01-14".parse().unwrap()), "Yesterday");
        assert_eq!(cal.format_day_of_week("2025-01-16".parse().unwrap()), "Thu, Jan 16");
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!(" Month ".parse::<Period>().unwrap(), Period::Month);
        assert!("year".parse::<Period>().is_err());
    }
}
