//! Turns a flat list of history records into the section hierarchy shown for
//! a time filter.

use crate::calendar::{Calendar, Period};
use crate::datekey::{format_date_key, format_month_key, DateKey, MonthKey};
use crate::error::ParseError;
use crate::grouping::{group_by_date, group_by_year, record_count, DayGroups, Timestamped};
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse time filter, shared with the history endpoint's `filter` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Day,
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 5] = [
        TimeFilter::Day,
        TimeFilter::Week,
        TimeFilter::Month,
        TimeFilter::Year,
        TimeFilter::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::Day => "Last 24 hours",
            TimeFilter::Week => "This week",
            TimeFilter::Month => "This month",
            TimeFilter::Year => "This year",
            TimeFilter::All => "All time",
        }
    }

    /// The day window pre-populated for this filter, if any.
    pub fn period(&self) -> Option<Period> {
        match self {
            TimeFilter::Week => Some(Period::Week),
            TimeFilter::Month => Some(Period::Month),
            _ => None,
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "today" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            _ => Err(ParseError::TimeFilter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySection<R> {
    pub key: DateKey,
    pub title: String,
    pub records: Vec<R>,
}

impl<R> DaySection<R> {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Empty sections start collapsed and show a placeholder instead of records.
    pub fn collapsed(&self) -> bool {
        self.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSection<R> {
    pub key: MonthKey,
    pub title: String,
    pub days: Vec<DaySection<R>>,
}

impl<R> MonthSection<R> {
    pub fn count(&self) -> usize {
        self.days.iter().map(DaySection::count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSection<R> {
    pub year: i32,
    pub months: Vec<MonthSection<R>>,
}

impl<R> YearSection<R> {
    pub fn count(&self) -> usize {
        self.months.iter().map(MonthSection::count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum HistoryView<R> {
    /// `day`: records as delivered, under a single heading.
    Today { title: String, records: Vec<R> },
    /// `week` / `month`: one section per window day, empty days included.
    Days { sections: Vec<DaySection<R>> },
    /// `year` / `all`: years, months and days, newest first, non-empty days only.
    Years { years: Vec<YearSection<R>> },
}

impl<R> HistoryView<R> {
    pub fn total(&self) -> usize {
        match self {
            HistoryView::Today { records, .. } => records.len(),
            HistoryView::Days { sections } => sections.iter().map(DaySection::count).sum(),
            HistoryView::Years { years } => years.iter().map(YearSection::count).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Build the view for `filter`.
///
/// For `week`/`month`, records whose day falls outside the window are not shown.
pub fn build_view<R, Tz>(filter: TimeFilter, records: Vec<R>, calendar: &Calendar<Tz>) -> HistoryView<R>
where
    R: Timestamped,
    Tz: TimeZone,
{
    match (filter, filter.period()) {
        (TimeFilter::Day, _) => HistoryView::Today {
            title: "Today".to_string(),
            records,
        },
        (_, Some(period)) => day_sections(records, calendar, period),
        (_, None) => year_sections(records, calendar),
    }
}

fn day_sections<R, Tz>(records: Vec<R>, calendar: &Calendar<Tz>, period: Period) -> HistoryView<R>
where
    R: Timestamped,
    Tz: TimeZone,
{
    let title = |key: DateKey| match period {
        Period::Week => calendar.format_day_of_week(key),
        Period::Month => format_date_key(key),
    };
    let mut by_day = group_by_date(records, calendar.zone());
    let sections: Vec<DaySection<R>> = calendar
        .dates_for_period(period)
        .into_iter()
        .map(|key| DaySection {
            key,
            title: title(key),
            records: by_day.remove(&key).unwrap_or_default(),
        })
        .collect();

    let outside = record_count(&by_day);
    if outside > 0 {
        tracing::debug!(period = %period, outside, "records outside the period window");
    }

    HistoryView::Days { sections }
}

fn year_sections<R, Tz>(records: Vec<R>, calendar: &Calendar<Tz>) -> HistoryView<R>
where
    R: Timestamped,
    Tz: TimeZone,
{
    let years = group_by_year(records, calendar.zone())
        .into_iter()
        .rev()
        .map(|(year, months)| YearSection {
            year,
            months: months
                .into_iter()
                .rev()
                .map(|(key, days)| MonthSection {
                    key,
                    title: format_month_key(key),
                    days: days_descending(days),
                })
                .collect(),
        })
        .collect();

    HistoryView::Years { years }
}

fn days_descending<R>(days: DayGroups<R>) -> Vec<DaySection<R>> {
    days.into_iter()
        .rev()
        .map(|(key, records)| DaySection {
            key,
            title: format_date_key(key),
            records,
        })
        .collect()
}
