//! Natural-language date ranges for the ingestion timestamp
//!
//! A small closed set of phrases (`today`, `past_week`, ...) and the custom
//! `YYYY-MM-DD_to_YYYY-MM-DD` form map to an inclusive millisecond window on
//! the `created` field. Unrecognized input yields no filter.

use crate::filter::FilterExpr;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Field every date-range filter applies to (when the record was scraped)
pub const DATE_FILTER_FIELD: &str = "created";

/// Separator of the custom range form
const CUSTOM_RANGE_SEPARATOR: &str = "_to_";

/// Recognized date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    Yesterday,
    /// `[now - N days, now]`
    PastDays(i64),
    /// Calendar dates, both inclusive
    Custom { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    /// Parse a phrase (case-insensitive, trimmed)
    pub fn parse(phrase: &str) -> Option<Self> {
        let phrase = phrase.trim().to_lowercase();

        match phrase.as_str() {
            "" => None,
            "today" => Some(DateRange::Today),
            "yesterday" => Some(DateRange::Yesterday),
            "past_week" | "past_7_days" => Some(DateRange::PastDays(7)),
            "past_month" | "past_30_days" => Some(DateRange::PastDays(30)),
            "past_3_months" | "past_90_days" => Some(DateRange::PastDays(90)),
            other if other.contains(CUSTOM_RANGE_SEPARATOR) => parse_custom(other),
            _ => None,
        }
    }

    /// Resolve to an inclusive `[start_ms, end_ms]` window anchored at `now`
    pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<(i64, i64)> {
        let tz = now.timezone();

        match *self {
            DateRange::Today => day_window(&tz, now.date_naive()),
            DateRange::Yesterday => day_window(&tz, now.date_naive().pred_opt()?),
            DateRange::PastDays(days) => {
                let start = now.clone() - Duration::days(days);
                Some((start.timestamp_millis(), now.timestamp_millis()))
            }
            DateRange::Custom { start, end } => {
                let start_ms = local_millis(&tz, start.and_hms_opt(0, 0, 0)?)?;
                let end_ms = local_millis(&tz, end.and_hms_opt(23, 59, 59)?)?;
                Some((start_ms, end_ms))
            }
        }
    }
}

fn parse_custom(phrase: &str) -> Option<DateRange> {
    let parts: Vec<&str> = phrase.split(CUSTOM_RANGE_SEPARATOR).collect();
    let [start, end] = parts.as_slice() else {
        return None;
    };

    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").ok()?;
    Some(DateRange::Custom { start, end })
}

fn day_window<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<(i64, i64)> {
    let start = local_millis(tz, day.and_hms_opt(0, 0, 0)?)?;
    let end = local_millis(tz, day.and_hms_opt(23, 59, 59)?)?;
    Some((start, end))
}

fn local_millis<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Typed filter for a phrase, anchored at `now`
pub fn date_range_filter<Tz: TimeZone>(phrase: &str, now: &DateTime<Tz>) -> Option<FilterExpr> {
    let (start, end) = DateRange::parse(phrase)?.window(now)?;
    Some(FilterExpr::between(DATE_FILTER_FIELD, start, end))
}

/// Filter string for a phrase using local wall-clock time; empty when unparseable
pub fn parse_date_range(phrase: &str) -> String {
    date_range_filter(phrase, &Local::now())
        .map(|f| f.render())
        .unwrap_or_default()
}
