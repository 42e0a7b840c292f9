//! Weekly activity histogram.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::models::WeekBucket;

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - Days::new(offset as u64)
}

/// UTC calendar date of an epoch-millisecond timestamp.
fn utc_date(timestamp_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| dt.date_naive())
}

/// Group match timestamps into Monday-aligned UTC weeks.
///
/// Buckets run from the week of the earliest event up to the week containing
/// `now`, with empty weeks included. Timestamps falling outside that range
/// are dropped.
pub fn bucket_weekly(timestamps: &[i64], now: DateTime<Utc>) -> Vec<WeekBucket> {
    let dates: Vec<NaiveDate> = timestamps.iter().filter_map(|&ts| utc_date(ts)).collect();
    let Some(earliest) = dates.iter().min() else {
        return Vec::new();
    };

    let anchor = week_start(*earliest);
    let mut buckets = Vec::new();
    let mut week = Some(anchor);
    while let Some(start) = week {
        if start.and_time(NaiveTime::MIN).and_utc() > now {
            break;
        }
        buckets.push(WeekBucket {
            week_start: start,
            count: 0,
        });
        week = start.checked_add_days(Days::new(7));
    }

    let mut dropped = 0usize;
    for date in &dates {
        let index = (week_start(*date) - anchor).num_days() / 7;
        match buckets.get_mut(index as usize) {
            Some(bucket) if index >= 0 => bucket.count += 1,
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!("Dropped {} activity timestamps outside the week range", dropped);
    }

    buckets
}
