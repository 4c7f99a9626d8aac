//! Single-pass bucketing of time-stamped records by local day, month and year.
//!
//! Maps are ordered by key (ascending); consumers pick the display direction.
//! Within each bucket records keep their input order.

use crate::datekey::{local_date_key, DateKey, MonthKey};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// Anything that carries the instant used for bucketing.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }
}

impl Timestamped for DateTime<Utc> {
    fn timestamp(&self) -> DateTime<Utc> {
        *self
    }
}

pub type DayGroups<R> = BTreeMap<DateKey, Vec<R>>;
pub type MonthGroups<R> = BTreeMap<MonthKey, DayGroups<R>>;
pub type YearGroups<R> = BTreeMap<i32, MonthGroups<R>>;

pub fn group_by_date<R, Tz>(records: impl IntoIterator<Item = R>, zone: &Tz) -> DayGroups<R>
where
    R: Timestamped,
    Tz: TimeZone,
{
    let mut days = DayGroups::new();
    for record in records {
        let key = local_date_key(&record.timestamp(), zone);
        days.entry(key).or_default().push(record);
    }
    days
}

pub fn group_by_month<R, Tz>(records: impl IntoIterator<Item = R>, zone: &Tz) -> MonthGroups<R>
where
    R: Timestamped,
    Tz: TimeZone,
{
    let mut months = MonthGroups::new();
    for record in records {
        let day = local_date_key(&record.timestamp(), zone);
        months
            .entry(day.month_key())
            .or_default()
            .entry(day)
            .or_default()
            .push(record);
    }
    months
}

pub fn group_by_year<R, Tz>(records: impl IntoIterator<Item = R>, zone: &Tz) -> YearGroups<R>
where
    R: Timestamped,
    Tz: TimeZone,
{
    let mut years = YearGroups::new();
    for record in records {
        let day = local_date_key(&record.timestamp(), zone);
        years
            .entry(day.year())
            .or_default()
            .entry(day.month_key())
            .or_default()
            .entry(day)
            .or_default()
            .push(record);
    }
    years
}

/// Number of records across all buckets.
pub fn record_count<R>(days: &DayGroups<R>) -> usize {
    days.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[derive(Debug, Clone, PartialEq)]
    struct Visit {
        id: u32,
        at: DateTime<Utc>,
    }

    impl Timestamped for Visit {
        fn timestamp(&self) -> DateTime<Utc> {
            self.at
        }
    }

    fn visit(id: u32, at: &str) -> Visit {
        Visit {
            id,
            at: at.parse::<DateTime<Utc>>().unwrap(),
        }
    }

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn ids(records: &[Visit]) -> Vec<u32> {
        records.iter().map(|v| v.id).collect()
    }

    fn sample() -> Vec<Visit> {
        vec![
            visit(1, "2025-01-05T10:00:00Z"),
            visit(2, "2024-12-31T23:59:00Z"),
            visit(3, "2025-02-10T08:00:00Z"),
            visit(4, "2025-01-05T09:00:00Z"),
            visit(5, "2025-01-20T12:00:00Z"),
            visit(6, "2024-11-02T07:30:00Z"),
            visit(7, "2025-02-10T21:00:00Z"),
        ]
    }

    #[test]
    fn test_group_by_date_scenario() {
        let records = vec![
            visit(1, "2025-01-05T10:00:00Z"),
            visit(2, "2025-01-05T23:00:00Z"),
            visit(3, "2025-01-06T01:00:00Z"),
        ];

        let days = group_by_date(records, &Utc);
        assert_eq!(days.len(), 2);
        assert_eq!(ids(&days[&key("2025-01-05")]), vec![1, 2]);
        assert_eq!(ids(&days[&key("2025-01-06")]), vec![3]);
    }

    #[test]
    fn test_group_by_date_empty() {
        let days = group_by_date(Vec::<Visit>::new(), &Utc);
        assert!(days.is_empty());
        assert!(group_by_month(Vec::<Visit>::new(), &Utc).is_empty());
        assert!(group_by_year(Vec::<Visit>::new(), &Utc).is_empty());
    }

    #[test]
    fn test_group_by_date_preserves_input_order_within_bucket() {
        // id 4 is earlier in the day than id 1 but comes later in the input
        let days = group_by_date(sample(), &Utc);
        assert_eq!(ids(&days[&key("2025-01-05")]), vec![1, 4]);
        assert_eq!(ids(&days[&key("2025-02-10")]), vec![3, 7]);
    }

    #[test]
    fn test_group_by_date_no_loss_or_duplication() {
        let records = sample();
        let days = group_by_date(&records, &Utc);
        assert_eq!(record_count(&days), records.len());

        for record in &records {
            let bucket = &days[&local_date_key(&record.at, &Utc)];
            assert_eq!(bucket.iter().filter(|r| r.id == record.id).count(), 1);
        }
    }

    #[test]
    fn test_group_by_date_uses_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let records = vec![
            visit(1, "2025-01-05T10:00:00Z"),
            visit(2, "2025-01-05T23:00:00Z"),
            visit(3, "2025-01-06T01:00:00Z"),
        ];
        let days = group_by_date(records, &plus_two);
        assert_eq!(ids(&days[&key("2025-01-05")]), vec![1]);
        assert_eq!(ids(&days[&key("2025-01-06")]), vec![2, 3]);
    }

    #[test]
    fn test_group_by_month_refines_to_group_by_date() {
        let records = sample();
        let days = group_by_date(&records, &Utc);
        let months = group_by_month(&records, &Utc);

        let mut flattened: DayGroups<&Visit> = BTreeMap::new();
        for (month, month_days) in &months {
            for (day, bucket) in month_days {
                assert_eq!(day.month_key(), *month);
                assert!(flattened.insert(*day, bucket.clone()).is_none());
            }
        }
        assert_eq!(flattened, days);
        assert_eq!(
            months.keys().map(|m| m.to_string()).collect::<Vec<_>>(),
            vec!["2024-11", "2024-12", "2025-01", "2025-02"]
        );
    }

    #[test]
    fn test_group_by_year_refines_to_group_by_month() {
        let records = sample();
        let months = group_by_month(&records, &Utc);
        let years = group_by_year(&records, &Utc);

        let mut flattened: MonthGroups<&Visit> = BTreeMap::new();
        for (year, year_months) in &years {
            for (month, month_days) in year_months {
                assert_eq!(month.year(), *year);
                assert!(flattened.insert(*month, month_days.clone()).is_none());
            }
        }
        assert_eq!(flattened, months);
        assert_eq!(years.keys().copied().collect::<Vec<_>>(), vec![2024, 2025]);
    }

    #[test]
    fn test_group_by_year_year_boundary() {
        let records = vec![
            visit(1, "2024-12-31T23:00:00Z"),
            visit(2, "2025-01-01T00:30:00Z"),
        ];
        let years = group_by_year(&records, &Utc);
        assert_eq!(years.len(), 2);
        assert_eq!(years[&2024].len(), 1);
        assert_eq!(years[&2025].len(), 1);

        // one hour east moves the first record into the new year
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        let years = group_by_year(&records, &plus_one);
        assert_eq!(years.keys().copied().collect::<Vec<_>>(), vec![2025]);
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let records = sample();
        let first = group_by_date(records.clone(), &Utc);
        let second = group_by_date(records, &Utc);
        assert_eq!(first, second);
    }

    #[test]
    fn test_group_by_date_large_dataset() {
        let mut records = Vec::new();
        for day in 1..=28 {
            for hour in 0..24 {
                let at = format!("2025-02-{:02}T{:02}:15:00Z", day, hour);
                records.push(visit(day * 100 + hour, &at));
            }
        }

        let days = group_by_date(&records, &Utc);
        assert_eq!(days.len(), 28);
        assert!(days.values().all(|bucket| bucket.len() == 24));
        assert_eq!(record_count(&days), 28 * 24);
    }
}
