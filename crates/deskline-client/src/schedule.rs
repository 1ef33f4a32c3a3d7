//! Schedule and vacation operations, including the weekly attendance
//! aggregation.
//!
//! Display-oriented reads (the vacation map, per-day attendance,
//! point-in-time vacation checks) fail open: on a backend error they
//! log and return an empty or default result rather than blocking the
//! caller. The weekly aggregation itself is all-or-nothing.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use deskline_core::{
  attendance::{AttendanceRow, DayAttendance, WeekTable, build_week_table},
  auth::AuthBackend,
  schedule::{
    DailySchedule, DailyScheduleUpsert, WeeklySchedule, WeeklyScheduleUpsert,
    materialize_week,
  },
  store::ScheduleStore,
  vacation::{
    DateRange, Vacation, VacationMap, VacationStatus, VacationUpsert,
    status_map,
  },
  week::{iso_year_week, workweek},
};
use tracing::warn;
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  session::SessionManager,
};

/// Schedule manager: weekly/daily schedule CRUD, vacation CRUD, and the
/// office-attendance read models.
pub struct ScheduleService<A, S> {
  session: Arc<SessionManager<A, S>>,
  store:   Arc<S>,
}

impl<A, S> ScheduleService<A, S>
where
  A: AuthBackend,
  S: ScheduleStore,
{
  pub fn new(session: Arc<SessionManager<A, S>>, store: Arc<S>) -> Self {
    Self { session, store }
  }

  // ── Weekly schedules ──────────────────────────────────────────────────

  /// The caller's weekly record for `week_start`, if any.
  pub async fn get_weekly_schedule(
    &self,
    week_start: NaiveDate,
  ) -> Result<Option<WeeklySchedule>> {
    let user = self.session.current_user().await?;
    self
      .store
      .get_weekly_schedule(user.id, week_start)
      .await
      .map_err(Error::backend)
  }

  /// Submit the caller's weekly schedule and fan it out into daily
  /// records.
  ///
  /// Validates nothing itself; callers run
  /// [`validate_wfh_days`](deskline_core::week::validate_wfh_days)
  /// first. A failed weekly upsert skips the fan-out entirely. A failed
  /// fan-out after a successful weekly upsert leaves the weekly record
  /// submitted with possibly stale daily rows; the failure is logged
  /// and the weekly record still returned (the backend offers no
  /// multi-table transaction to close this window).
  pub async fn save_weekly_schedule(
    &self,
    week_start: NaiveDate,
    wfh_days: &[u8],
  ) -> Result<WeeklySchedule> {
    let user = self.session.current_user().await?;
    let (year, week_number) = iso_year_week(week_start);

    let weekly = self
      .store
      .upsert_weekly_schedule(WeeklyScheduleUpsert {
        user_id: user.id,
        week_start,
        year,
        week_number,
        wfh_days: wfh_days.to_vec(),
        is_submitted: true,
        submitted_at: Utc::now(),
      })
      .await
      .map_err(Error::backend)?;

    let batch = materialize_week(user.id, week_start, wfh_days);
    if let Err(err) = self.store.upsert_daily_schedules(batch).await {
      warn!(
        error = %err, %week_start,
        "daily fan-out failed after weekly save; daily records may be stale"
      );
    }

    Ok(weekly)
  }

  // ── Daily schedules ───────────────────────────────────────────────────

  pub async fn get_daily_schedule(
    &self,
    date: NaiveDate,
  ) -> Result<Option<DailySchedule>> {
    let user = self.session.current_user().await?;
    self
      .store
      .get_daily_schedule(user.id, date)
      .await
      .map_err(Error::backend)
  }

  pub async fn update_daily_schedule(
    &self,
    date: NaiveDate,
    is_wfh: bool,
    notes: Option<String>,
  ) -> Result<DailySchedule> {
    let user = self.session.current_user().await?;
    self
      .store
      .upsert_daily_schedule(DailyScheduleUpsert {
        user_id: user.id,
        date,
        is_wfh,
        notes,
      })
      .await
      .map_err(Error::backend)
  }

  // ── Office attendance ─────────────────────────────────────────────────

  /// One day of attendance from the `get_office_attendance` procedure.
  pub async fn office_attendance(
    &self,
    date: NaiveDate,
  ) -> Result<Vec<AttendanceRow>> {
    self.store.office_attendance(date).await.map_err(Error::backend)
  }

  /// Procedure attendance for each workweek day. A day whose call fails
  /// contributes an empty row set (display-only, fail-open per day).
  pub async fn weekly_office_attendance(
    &self,
    week_start: NaiveDate,
  ) -> Result<Vec<DayAttendance>> {
    let mut days = Vec::with_capacity(5);
    for date in workweek(week_start) {
      let rows = match self.store.office_attendance(date).await {
        Ok(rows) => rows,
        Err(err) => {
          warn!(error = %err, %date, "attendance lookup failed for day");
          Vec::new()
        }
      };
      days.push(DayAttendance {
        date,
        day_name: date.format("%A").to_string(),
        rows,
      });
    }
    Ok(days)
  }

  /// The full weekly attendance table: every profile, every workweek
  /// day, with vacation > WFH > office precedence and summary counts.
  ///
  /// Profile or schedule load failures abort the whole call; partial
  /// tables are never returned. The vacation map is fail-open
  /// internally, so a vacation lookup failure shows everyone as
  /// present rather than failing the table.
  pub async fn weekly_office_status(
    &self,
    week_start: NaiveDate,
  ) -> Result<WeekTable> {
    let profiles = self.store.list_profiles().await.map_err(Error::backend)?;

    let range = DateRange::workweek_of(week_start);
    let schedules = self
      .store
      .daily_schedules_in_range(range)
      .await
      .map_err(Error::backend)?;

    let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
    let vacations = self.vacation_status_map(&ids, range).await;

    Ok(build_week_table(week_start, &profiles, &schedules, &vacations))
  }

  // ── Vacations ─────────────────────────────────────────────────────────

  /// Per-principal vacation dates within `range`. Fail-open: a backend
  /// error yields an empty map, never propagates.
  pub async fn vacation_status_map(
    &self,
    user_ids: &[Uuid],
    range: DateRange,
  ) -> VacationMap {
    match self
      .store
      .approved_vacations_overlapping(user_ids, range)
      .await
    {
      Ok(records) => status_map(&records, range),
      Err(err) => {
        warn!(error = %err, "vacation lookup failed, treating all as present");
        VacationMap::new()
      }
    }
  }

  /// The caller's active or next upcoming vacation.
  pub async fn current_vacation(&self) -> Result<Option<Vacation>> {
    let user = self.session.current_user().await?;
    let today = Utc::now().date_naive();
    self
      .store
      .current_vacation(user.id, today)
      .await
      .map_err(Error::backend)
  }

  /// Save a vacation interval for the caller. Auto-approved for now;
  /// an approval workflow would set `Pending` here instead.
  pub async fn save_vacation(
    &self,
    start_date: NaiveDate,
    end_date: NaiveDate,
    notes: Option<String>,
  ) -> Result<Vacation> {
    let user = self.session.current_user().await?;
    self
      .store
      .upsert_vacation(VacationUpsert {
        user_id: user.id,
        start_date,
        end_date,
        status: VacationStatus::Approved,
        notes,
      })
      .await
      .map_err(Error::backend)
  }

  /// Remove the caller's current-or-future vacations. Past intervals
  /// are never touched.
  pub async fn clear_vacation(&self) -> Result<()> {
    let user = self.session.current_user().await?;
    let today = Utc::now().date_naive();
    self
      .store
      .clear_vacations_from(user.id, today)
      .await
      .map_err(Error::backend)
  }

  /// Whether `user_id` is on approved vacation on `date`. Fail-open
  /// false (display-only).
  pub async fn is_on_vacation(&self, user_id: Uuid, date: NaiveDate) -> bool {
    match self.store.is_on_vacation(user_id, date).await {
      Ok(on_vacation) => on_vacation,
      Err(err) => {
        warn!(error = %err, %user_id, %date, "vacation check failed");
        false
      }
    }
  }

  // ── Health ────────────────────────────────────────────────────────────

  /// Whether the relational backend answers a minimal query.
  pub async fn check_connection(&self) -> bool {
    match self.store.ping().await {
      Ok(()) => true,
      Err(err) => {
        warn!(error = %err, "backend health check failed");
        false
      }
    }
  }
}
