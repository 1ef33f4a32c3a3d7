//! Calendar helpers for the Monday-to-Friday workweek.
//!
//! All schedule records are keyed by the Monday that starts their week.
//! Week numbers follow the ISO 8601 rule: the week containing the first
//! Thursday of a year is week 1 of that year.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{Result, ValidationError};

/// Company policy default: at most two WFH days per week.
pub const DEFAULT_MAX_WFH_DAYS: usize = 2;

/// Length of the scheduled workweek (Monday..Friday).
pub const WORKWEEK_DAYS: usize = 5;

/// The Monday of the week containing `date`.
///
/// Sunday belongs to the week that *ended* on it, so a Sunday input maps
/// to the previous day's Monday, six days back.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
  date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// The Monday of the week after the one containing `date`.
pub fn next_week_start(date: NaiveDate) -> NaiveDate {
  week_start_of(date) + Days::new(7)
}

/// `(iso_year, iso_week)` for `date`, per the first-Thursday rule.
///
/// Note that the ISO year can differ from the calendar year around
/// January 1st: a Monday in late December whose week contains the next
/// January 1st still reports the old year's final week (52 or 53).
pub fn iso_year_week(date: NaiveDate) -> (i32, u32) {
  let week = date.iso_week();
  (week.year(), week.week())
}

/// The five workweek dates starting at `week_start` (assumed a Monday).
pub fn workweek(week_start: NaiveDate) -> [NaiveDate; WORKWEEK_DAYS] {
  std::array::from_fn(|i| week_start + Days::new(i as u64))
}

/// Validate a WFH weekday selection against the per-week maximum.
///
/// Indices are 1=Monday..5=Friday. Exposed separately from
/// [`save`](crate::store::ScheduleStore::upsert_weekly_schedule) paths on
/// purpose: saving validates nothing itself, callers run this first.
pub fn validate_wfh_days(days: &[u8], max: usize) -> Result<()> {
  if days.len() > max {
    return Err(ValidationError::TooManyWfhDays {
      max,
      requested: days.len(),
    });
  }
  if let Some(&day) = days.iter().find(|&&d| !(1..=5).contains(&d)) {
    return Err(ValidationError::WeekdayOutOfRange(day));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  #[test]
  fn week_start_is_identity_on_mondays() {
    let monday = d(2025, 6, 2);
    assert_eq!(week_start_of(monday), monday);
  }

  #[test]
  fn week_start_handles_midweek_and_sunday() {
    // Wednesday 2025-06-04 and Sunday 2025-06-08 share the same Monday.
    assert_eq!(week_start_of(d(2025, 6, 4)), d(2025, 6, 2));
    assert_eq!(week_start_of(d(2025, 6, 8)), d(2025, 6, 2));
  }

  #[test]
  fn next_week_start_is_seven_days_out() {
    assert_eq!(next_week_start(d(2025, 6, 4)), d(2025, 6, 9));
  }

  #[test]
  fn iso_week_of_ordinary_monday() {
    // 2025-06-02 is the Monday of ISO week 23, 2025.
    assert_eq!(iso_year_week(d(2025, 6, 2)), (2025, 23));
  }

  #[test]
  fn iso_week_spanning_new_year_reports_old_year() {
    // The week starting Monday 2026-12-28 contains 2027-01-01, but its
    // Thursday (2026-12-31) falls in 2026, so it is week 53 of 2026.
    assert_eq!(iso_year_week(d(2026, 12, 28)), (2026, 53));
    assert_eq!(iso_year_week(d(2027, 1, 1)), (2026, 53));
  }

  #[test]
  fn iso_week_one_starts_in_prior_december() {
    // Monday 2024-12-30 belongs to week 1 of 2025 (Thursday 2025-01-02).
    assert_eq!(iso_year_week(d(2024, 12, 30)), (2025, 1));
  }

  #[test]
  fn workweek_enumerates_monday_to_friday() {
    let days = workweek(d(2025, 6, 2));
    assert_eq!(days[0], d(2025, 6, 2));
    assert_eq!(days[4], d(2025, 6, 6));
  }

  #[test]
  fn validate_accepts_within_limit() {
    assert!(validate_wfh_days(&[2, 4], 2).is_ok());
    assert!(validate_wfh_days(&[], 2).is_ok());
  }

  #[test]
  fn validate_rejects_too_many_days() {
    assert_eq!(
      validate_wfh_days(&[1, 2, 3], 2),
      Err(ValidationError::TooManyWfhDays { max: 2, requested: 3 })
    );
  }

  #[test]
  fn validate_rejects_out_of_range_weekday() {
    assert_eq!(
      validate_wfh_days(&[1, 6], 2),
      Err(ValidationError::WeekdayOutOfRange(6))
    );
    assert_eq!(
      validate_wfh_days(&[0], 2),
      Err(ValidationError::WeekdayOutOfRange(0))
    );
  }
}
