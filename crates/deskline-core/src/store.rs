//! The `ScheduleStore` trait — the relational query surface consumed by
//! the scheduling services.
//!
//! Implemented by storage backends (e.g. `deskline-backend-rest` over
//! the hosted service's query API). All writes are upserts keyed as
//! documented on each record type; concurrent writers resolve by
//! last-write-wins at the storage layer.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  attendance::AttendanceRow,
  profile::{Profile, ProfileUpsert},
  schedule::{
    DailySchedule, DailyScheduleUpsert, WeeklySchedule, WeeklyScheduleUpsert,
  },
  vacation::{DateRange, Vacation, VacationUpsert},
};

/// Abstraction over the hosted relational backend.
///
/// Row-absent lookups return `Ok(None)`; they are successful outcomes,
/// never errors. All methods return `Send` futures.
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Single-row lookup by principal id.
  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Create-or-update keyed by `id`.
  fn upsert_profile(
    &self,
    input: ProfileUpsert,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// All profiles, ordered by `full_name` ascending (case-sensitive
  /// ordinal; names are assumed distinct in practice).
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  // ── Weekly schedules ──────────────────────────────────────────────────

  fn get_weekly_schedule(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> impl Future<Output = Result<Option<WeeklySchedule>, Self::Error>> + Send + '_;

  /// Upsert keyed by `(user_id, week_start)`.
  fn upsert_weekly_schedule(
    &self,
    input: WeeklyScheduleUpsert,
  ) -> impl Future<Output = Result<WeeklySchedule, Self::Error>> + Send + '_;

  // ── Daily schedules ───────────────────────────────────────────────────

  fn get_daily_schedule(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<DailySchedule>, Self::Error>> + Send + '_;

  /// Upsert keyed by `(user_id, date)`.
  fn upsert_daily_schedule(
    &self,
    input: DailyScheduleUpsert,
  ) -> impl Future<Output = Result<DailySchedule, Self::Error>> + Send + '_;

  /// Batch upsert for the weekly fan-out, same `(user_id, date)` key.
  fn upsert_daily_schedules(
    &self,
    batch: Vec<DailyScheduleUpsert>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All daily records (any principal) with `date` inside `range`,
  /// in one query.
  fn daily_schedules_in_range(
    &self,
    range: DateRange,
  ) -> impl Future<Output = Result<Vec<DailySchedule>, Self::Error>> + Send + '_;

  // ── Vacations ─────────────────────────────────────────────────────────

  /// Approved vacations for the given principals whose interval
  /// overlaps `range` (closed-interval test).
  fn approved_vacations_overlapping<'a>(
    &'a self,
    user_ids: &'a [Uuid],
    range: DateRange,
  ) -> impl Future<Output = Result<Vec<Vacation>, Self::Error>> + Send + 'a;

  /// The earliest vacation for `user_id` ending on or after `from`.
  fn current_vacation(
    &self,
    user_id: Uuid,
    from: NaiveDate,
  ) -> impl Future<Output = Result<Option<Vacation>, Self::Error>> + Send + '_;

  /// Upsert keyed by `(user_id, start_date)`.
  fn upsert_vacation(
    &self,
    input: VacationUpsert,
  ) -> impl Future<Output = Result<Vacation, Self::Error>> + Send + '_;

  /// Delete `user_id`'s vacations ending on or after `from`. Past
  /// intervals are never deleted.
  fn clear_vacations_from(
    &self,
    user_id: Uuid,
    from: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Whether an approved vacation covers `date` for `user_id`.
  fn is_on_vacation(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Stored procedures ─────────────────────────────────────────────────

  /// Call the read-only `get_office_attendance(target_date)` procedure.
  fn office_attendance(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<AttendanceRow>, Self::Error>> + Send + '_;

  // ── Health ────────────────────────────────────────────────────────────

  /// Cheapest possible round trip, used as a connection probe.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
