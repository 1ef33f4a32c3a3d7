//! Weekly and daily schedule records.
//!
//! The weekly record is the declared intent; the daily records are the
//! materialised view consumed by attendance queries. Saving a weekly
//! record must fan out into up to five daily records covering
//! Monday..Friday of that week.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::week::workweek;

// ─── Weekly ──────────────────────────────────────────────────────────────────

/// A row of the `weekly_schedules` table. Keyed by `(user_id, week_start)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
  pub user_id:      Uuid,
  /// The Monday that starts the week.
  pub week_start:   NaiveDate,
  /// ISO year of `week_start` (can differ from the calendar year around
  /// January 1st).
  pub year:         i32,
  /// ISO week number, first-Thursday rule.
  pub week_number:  u32,
  /// Weekday indices marked WFH, 1=Monday..5=Friday.
  #[serde(default)]
  pub wfh_days:     Vec<u8>,
  #[serde(default)]
  pub is_submitted: bool,
  #[serde(default)]
  pub submitted_at: Option<DateTime<Utc>>,
}

/// Input to [`crate::store::ScheduleStore::upsert_weekly_schedule`].
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyScheduleUpsert {
  pub user_id:      Uuid,
  pub week_start:   NaiveDate,
  pub year:         i32,
  pub week_number:  u32,
  pub wfh_days:     Vec<u8>,
  pub is_submitted: bool,
  pub submitted_at: DateTime<Utc>,
}

// ─── Daily ───────────────────────────────────────────────────────────────────

/// A row of the `wfh_schedules` table. Keyed by `(user_id, date)`;
/// at most one record exists per principal per date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySchedule {
  pub user_id: Uuid,
  pub date:    NaiveDate,
  pub is_wfh:  bool,
  #[serde(default)]
  pub notes:   Option<String>,
}

/// Input to the daily upsert operations on
/// [`crate::store::ScheduleStore`].
#[derive(Debug, Clone, Serialize)]
pub struct DailyScheduleUpsert {
  pub user_id: Uuid,
  pub date:    NaiveDate,
  pub is_wfh:  bool,
  /// `None` leaves the column untouched on upsert (the fan-out never
  /// clobbers hand-written notes); `Some("")` clears it.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes:   Option<String>,
}

/// The write-side fan-out: one daily upsert per workweek day, WFH
/// exactly where the weekday index appears in `wfh_days`.
pub fn materialize_week(
  user_id: Uuid,
  week_start: NaiveDate,
  wfh_days: &[u8],
) -> Vec<DailyScheduleUpsert> {
  workweek(week_start)
    .into_iter()
    .enumerate()
    .map(|(i, date)| DailyScheduleUpsert {
      user_id,
      date,
      is_wfh: wfh_days.contains(&(i as u8 + 1)),
      notes: None,
    })
    .collect()
}
