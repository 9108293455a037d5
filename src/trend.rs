//! Rolling per-day trend of report volume.

use crate::types::{Report, TrendBucket};
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

pub const DEFAULT_WINDOW_DAYS: usize = 7;

/// Calendar date of a millisecond instant in `tz`.
pub fn local_day<Tz: TimeZone>(tz: &Tz, millis: i64) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.date_naive())
}

fn day_label(day: NaiveDate) -> String {
    day.format("%b %-d").to_string()
}

/// Bucket `reports` into the `days` calendar days ending today (inclusive),
/// oldest first. Day boundaries are those of `now`'s time zone.
///
/// Reports created outside the window contribute to no bucket.
pub fn build_trend<Tz: TimeZone>(
    reports: &[Report],
    days: usize,
    now: &DateTime<Tz>,
) -> Vec<TrendBucket> {
    let today = now.date_naive();
    let mut buckets: Vec<TrendBucket> = (0..days)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back as i64);
            TrendBucket {
                date_label: day_label(day),
                day,
                total: 0,
                resolved: 0,
                active: 0,
            }
        })
        .collect();
    let Some(first) = buckets.first().map(|b| b.day) else {
        return buckets;
    };

    let tz = now.timezone();
    let mut outside = 0usize;
    for r in reports {
        let Some(day) = local_day(&tz, r.created_at) else {
            outside += 1;
            continue;
        };
        let offset = (day - first).num_days();
        match usize::try_from(offset).ok().and_then(|i| buckets.get_mut(i)) {
            Some(bucket) => {
                bucket.total += 1;
                if r.is_resolved() {
                    bucket.resolved += 1;
                }
            }
            None => outside += 1,
        }
    }
    for bucket in &mut buckets {
        bucket.active = bucket.total - bucket.resolved;
    }
    log::debug!(
        "trend over {days} days: {} in window, {outside} outside",
        reports.len() - outside
    );
    buckets
}

/// [`build_trend`] against the wall clock in the local time zone.
pub fn build_local_trend(reports: &[Report], days: usize) -> Vec<TrendBucket> {
    build_trend(reports, days, &Local::now())
}
