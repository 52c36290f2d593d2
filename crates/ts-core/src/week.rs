//! Weekly-calendar core
//!
//! A user's timesheet is a row per calendar day, bucketed into 7-day ranges
//! that start at a fixed epoch rather than on ISO week boundaries. This
//! module holds the pure bookkeeping: generating those ranges, parsing their
//! labels, and planning which missing days a read must materialize.
//!
//! Missing rows are created opportunistically at read time; there is no
//! scheduled job. `plan_backfill` decides what a read has to insert so the
//! invariant "one row per calendar day from the epoch through today" holds
//! once a week has been viewed.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{AppError, AppResult};
use crate::types::{format_mdy, parse_flexible_date};

/// First day ever trackable. Week buckets are anchored here, not on weekday
/// boundaries.
pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2016, 8, 1) {
    Some(d) => d,
    None => panic!("epoch is a valid date"),
};

/// One 7-day (or truncated final) bucket of the timesheet calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    /// Render as the wire label `MM/DD/YYYY-MM/DD/YYYY`.
    pub fn label(&self) -> String {
        format!("{}-{}", format_mdy(self.start), format_mdy(self.end))
    }

    /// Number of calendar days covered, inclusive.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for WeekRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Produce the ordered sequence of week buckets covering `[EPOCH, today]`.
///
/// Buckets are contiguous and non-overlapping; the final bucket is truncated
/// so it ends on `today`. An empty vec is only possible when `today` predates
/// the epoch.
pub fn week_ranges(today: NaiveDate) -> Vec<WeekRange> {
    let mut ranges = Vec::new();
    let mut start = EPOCH;
    while start <= today {
        let end = (start + Duration::days(6)).min(today);
        ranges.push(WeekRange { start, end });
        start += Duration::days(7);
    }
    ranges
}

/// Parse a week label back into its `(start, end)` dates.
pub fn parse_range(label: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let (start_str, end_str) = label
        .split_once('-')
        .ok_or_else(|| AppError::validation(format!("malformed date range: {label}")))?;
    let start = parse_flexible_date(start_str)
        .ok_or_else(|| AppError::validation(format!("invalid start date: {start_str}")))?;
    let end = parse_flexible_date(end_str)
        .ok_or_else(|| AppError::validation(format!("invalid end date: {end_str}")))?;
    if start > end {
        return Err(AppError::validation(format!(
            "start date after end date: {label}"
        )));
    }
    Ok((start, end))
}

/// Every calendar day in `[start, end]` inclusive.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Decide which dates a read of `[start, end]` must materialize.
///
/// `existing` is the sorted list of dates the user already has rows for in
/// the range. Three cases:
/// 1. No rows at all: synthesize the full range.
/// 2. Rows exist, but the newest one is neither a Sunday nor today-or-later:
///    the user's last visit left the week unfinished and time has passed, so
///    backfill from the day after the newest row through today.
/// 3. Otherwise nothing to do; repeated calls within the same day are
///    idempotent.
pub fn plan_backfill(
    existing: &[NaiveDate],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Vec<NaiveDate> {
    let last = match existing.last() {
        None => return days_in_range(start, end),
        Some(&last) => last,
    };
    if last.weekday() != Weekday::Sun && last < today {
        days_in_range(last + Duration::days(1), today)
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_two_buckets_with_truncated_tail() {
        let today = date(2016, 8, 10);
        let labels: Vec<String> = week_ranges(today).iter().map(WeekRange::label).collect();
        assert_eq!(
            labels,
            vec!["08/01/2016-08/07/2016", "08/08/2016-08/10/2016"]
        );
    }

    #[test]
    fn test_single_day_calendar() {
        let ranges = week_ranges(EPOCH);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, EPOCH);
        assert_eq!(ranges[0].end, EPOCH);
    }

    #[test]
    fn test_today_before_epoch_is_empty() {
        assert!(week_ranges(date(2016, 7, 31)).is_empty());
    }

    #[test]
    fn test_buckets_cover_range_exactly() {
        // Contiguity and coverage over a spread of end dates.
        for offset in [0, 1, 6, 7, 13, 100, 365, 1000] {
            let today = EPOCH + Duration::days(offset);
            let ranges = week_ranges(today);

            assert_eq!(ranges.first().map(|r| r.start), Some(EPOCH));
            assert_eq!(ranges.last().map(|r| r.end), Some(today));
            for r in &ranges {
                assert!(r.len_days() <= 7, "bucket too long: {r}");
                assert!(r.start <= r.end);
            }
            for pair in ranges.windows(2) {
                assert_eq!(
                    pair[0].end + Duration::days(1),
                    pair[1].start,
                    "gap or overlap between {} and {}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn test_all_buckets_but_last_are_full_weeks() {
        let ranges = week_ranges(date(2020, 3, 18));
        for r in &ranges[..ranges.len() - 1] {
            assert_eq!(r.len_days(), 7);
        }
    }

    #[test]
    fn test_parse_range_round_trip() {
        let (start, end) = parse_range("08/01/2016-08/07/2016").unwrap();
        assert_eq!(start, date(2016, 8, 1));
        assert_eq!(end, date(2016, 8, 7));
    }

    #[test]
    fn test_parse_range_rejects_malformed() {
        assert!(parse_range("08/01/2016").is_err());
        assert!(parse_range("hello-world").is_err());
        assert!(parse_range("08/07/2016-08/01/2016").is_err());
    }

    #[test]
    fn test_backfill_empty_range_fills_every_day() {
        let planned = plan_backfill(&[], date(2016, 8, 1), date(2016, 8, 7), date(2016, 8, 10));
        assert_eq!(planned.len(), 7);
        assert_eq!(planned[0], date(2016, 8, 1));
        assert_eq!(planned[6], date(2016, 8, 7));
    }

    #[test]
    fn test_backfill_gap_extends_through_today() {
        // Last row on Wednesday 2016-08-03, today is Saturday 2016-08-06.
        let existing = days_in_range(date(2016, 8, 1), date(2016, 8, 3));
        let planned = plan_backfill(&existing, date(2016, 8, 1), date(2016, 8, 7), date(2016, 8, 6));
        assert_eq!(planned, days_in_range(date(2016, 8, 4), date(2016, 8, 6)));
    }

    #[test]
    fn test_backfill_noop_when_week_ends_on_sunday() {
        // 2016-08-07 is a Sunday; even though time has passed, the week is closed.
        let existing = days_in_range(date(2016, 8, 1), date(2016, 8, 7));
        let planned =
            plan_backfill(&existing, date(2016, 8, 1), date(2016, 8, 7), date(2016, 8, 20));
        assert!(planned.is_empty());
    }

    #[test]
    fn test_backfill_noop_when_last_row_is_today() {
        let existing = days_in_range(date(2016, 8, 8), date(2016, 8, 10));
        let planned =
            plan_backfill(&existing, date(2016, 8, 8), date(2016, 8, 14), date(2016, 8, 10));
        assert!(planned.is_empty());
    }

    #[test]
    fn test_backfill_idempotent() {
        // After applying the plan once, a second plan over the union is empty.
        let start = date(2016, 8, 1);
        let end = date(2016, 8, 7);
        let today = date(2016, 8, 5);
        let mut existing = days_in_range(start, date(2016, 8, 2));
        let planned = plan_backfill(&existing, start, end, today);
        existing.extend(planned);
        assert!(plan_backfill(&existing, start, end, today).is_empty());
    }

    #[test]
    fn test_days_in_range_inclusive() {
        assert_eq!(days_in_range(EPOCH, EPOCH), vec![EPOCH]);
        assert_eq!(days_in_range(EPOCH, EPOCH + Duration::days(2)).len(), 3);
        assert!(days_in_range(EPOCH, EPOCH - Duration::days(1)).is_empty());
    }
}
