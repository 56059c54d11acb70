// src/services/leave.rs

use crate::errors::{AppError, AppResult};
use chrono::{FixedOffset, NaiveDate, Utc};

/// Quota bucket subject to the annual-quota check. Other quota types
/// bypass it.
pub const ANNUAL_QUOTA_TYPE: &str = "tahunan";

/// Requests filed with this reason never consume quota on approval.
pub const SICK_REASON: &str = "Sakit";

/// Inclusive overlap test on [start, end] ranges.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Day count of an inclusive [start, end] range.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Today as seen from the office timezone. Leave dates are civil dates in
/// that zone, so "is this in the past" must not be answered in UTC.
pub fn today_in_office(tz: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Date-shape checks shared by leave and permission requests.
pub fn validate_request_dates(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> AppResult<()> {
    if start > end {
        return Err(AppError::Validation(
            "start_date cannot be after end_date".to_string(),
        ));
    }
    if start < today {
        return Err(AppError::Validation(
            "start_date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Quota check for annual leave: remaining = total − used must cover the
/// requested day count.
pub fn check_quota(total_quota: i32, used_quota: i32, requested_days: i64) -> AppResult<()> {
    let remaining = i64::from(total_quota) - i64::from(used_quota);
    if remaining < requested_days {
        return Err(AppError::Validation(format!(
            "insufficient leave quota: {} day(s) remaining, {} requested",
            remaining, requested_days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn overlapping_ranges_detected() {
        // existing [5,10] vs new [8,12]
        assert!(ranges_overlap(day(5), day(10), day(8), day(12)));
        // touching at a boundary still overlaps (inclusive)
        assert!(ranges_overlap(day(5), day(10), day(10), day(12)));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        // existing [5,10] vs new [11,15]
        assert!(!ranges_overlap(day(5), day(10), day(11), day(15)));
    }

    #[test]
    fn day_count_is_inclusive() {
        assert_eq!(inclusive_day_count(day(5), day(10)), 6);
        assert_eq!(inclusive_day_count(day(5), day(5)), 1);
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(validate_request_dates(day(10), day(5), day(1)).is_err());
    }

    #[test]
    fn rejects_start_in_the_past() {
        assert!(validate_request_dates(day(5), day(10), day(6)).is_err());
        assert!(validate_request_dates(day(6), day(10), day(6)).is_ok());
    }

    #[test]
    fn quota_must_cover_requested_days() {
        assert!(check_quota(12, 7, 5).is_ok());
        assert!(check_quota(12, 8, 5).is_err());
        assert!(check_quota(12, 12, 1).is_err());
    }
}
