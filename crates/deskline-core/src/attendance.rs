//! The weekly attendance table — the computed read model for "who is in
//! the office when".
//!
//! Never stored, always derived from profiles, daily schedule records,
//! and the vacation overlap map. Status precedence, highest to lowest:
//! on vacation > explicit WFH > explicit office > default office (no
//! daily record for that date).

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  profile::Profile,
  schedule::DailySchedule,
  vacation::VacationMap,
  week::{WORKWEEK_DAYS, workweek},
};

// ─── Weekday descriptors ─────────────────────────────────────────────────────

/// One column header of the week table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekDay {
  pub date:       NaiveDate,
  /// Long English name, e.g. `"Monday"`.
  pub day_name:   String,
  /// Short English name, e.g. `"Mon"`.
  pub day_short:  String,
  /// 1=Monday..5=Friday.
  pub day_number: u8,
}

impl WeekDay {
  /// The five weekday descriptors for the week starting at `week_start`.
  pub fn for_week(week_start: NaiveDate) -> Vec<WeekDay> {
    workweek(week_start)
      .into_iter()
      .enumerate()
      .map(|(i, date)| WeekDay {
        date,
        day_name: date.format("%A").to_string(),
        day_short: date.format("%a").to_string(),
        day_number: i as u8 + 1,
      })
      .collect()
  }
}

// ─── Per-day status ──────────────────────────────────────────────────────────

/// One principal's derived status for one weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStatus {
  pub date:           NaiveDate,
  pub day_number:     u8,
  pub is_wfh:         bool,
  pub is_in_office:   bool,
  pub is_on_vacation: bool,
  /// Whether a daily schedule record exists for this exact date.
  pub has_schedule:   bool,
}

impl DayStatus {
  /// Derive a day's status from an optional scheduled WFH flag and the
  /// vacation map verdict. No record means "in office" by default.
  pub fn derive(
    date: NaiveDate,
    day_number: u8,
    scheduled_wfh: Option<bool>,
    on_vacation: bool,
  ) -> Self {
    let is_wfh = scheduled_wfh.unwrap_or(false);
    Self {
      date,
      day_number,
      is_wfh,
      is_in_office: !is_wfh,
      is_on_vacation: on_vacation,
      has_schedule: scheduled_wfh.is_some(),
    }
  }
}

// ─── Rows and table ──────────────────────────────────────────────────────────

/// The identity fields echoed into each table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSummary {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  pub department: Option<String>,
}

/// One principal's row: five day statuses plus summary counts.
///
/// The three counts partition the workweek: every day is exactly one of
/// office, WFH, or vacation, so they always sum to
/// [`WORKWEEK_DAYS`](crate::week::WORKWEEK_DAYS).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWeekStatus {
  pub member:         MemberSummary,
  pub week_start:     NaiveDate,
  pub daily_status:   Vec<DayStatus>,
  pub office_count:   usize,
  pub wfh_count:      usize,
  pub vacation_count: usize,
}

/// The full weekly attendance table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekTable {
  pub week_days:     Vec<WeekDay>,
  pub members:       Vec<MemberWeekStatus>,
  pub total_members: usize,
  pub week_start:    NaiveDate,
}

/// A row returned by the `get_office_attendance` stored procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRow {
  pub user_id:      Uuid,
  pub full_name:    String,
  pub email:        String,
  pub department:   Option<String>,
  pub is_in_office: bool,
}

/// One day of stored-procedure attendance, as assembled by the weekly
/// office-attendance query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAttendance {
  pub date:     NaiveDate,
  pub day_name: String,
  pub rows:     Vec<AttendanceRow>,
}

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Assemble the week table from already-loaded inputs.
///
/// `profiles` ordering is preserved (the store returns them sorted by
/// `full_name` ascending). `schedules` may contain records for any
/// principal and any date; only `(principal, workweek date)` pairs are
/// consulted. Vacation takes precedence over the schedule flag when
/// counting, but the raw `is_wfh`/`is_in_office` flags still reflect
/// the underlying record for display.
pub fn build_week_table(
  week_start: NaiveDate,
  profiles: &[Profile],
  schedules: &[DailySchedule],
  vacations: &VacationMap,
) -> WeekTable {
  let week_days = WeekDay::for_week(week_start);

  // (principal, date) -> is_wfh lookup.
  let mut by_user_date: HashMap<(Uuid, NaiveDate), bool> =
    HashMap::with_capacity(schedules.len());
  for record in schedules {
    by_user_date.insert((record.user_id, record.date), record.is_wfh);
  }

  let members: Vec<MemberWeekStatus> = profiles
    .iter()
    .map(|profile| {
      let daily_status: Vec<DayStatus> = week_days
        .iter()
        .map(|day| {
          let scheduled = by_user_date.get(&(profile.id, day.date)).copied();
          let on_vacation = vacations
            .get(&profile.id)
            .is_some_and(|days| days.contains(&day.date));
          DayStatus::derive(day.date, day.day_number, scheduled, on_vacation)
        })
        .collect();

      let vacation_count =
        daily_status.iter().filter(|d| d.is_on_vacation).count();
      let wfh_count = daily_status
        .iter()
        .filter(|d| d.is_wfh && !d.is_on_vacation)
        .count();
      let office_count = daily_status
        .iter()
        .filter(|d| d.is_in_office && !d.is_on_vacation)
        .count();

      MemberWeekStatus {
        member: MemberSummary {
          id:         profile.id,
          name:       profile.full_name.clone(),
          email:      profile.email.clone(),
          department: profile.department.clone(),
        },
        week_start,
        daily_status,
        office_count,
        wfh_count,
        vacation_count,
      }
    })
    .collect();

  WeekTable {
    week_days,
    total_members: members.len(),
    members,
    week_start,
  }
}
