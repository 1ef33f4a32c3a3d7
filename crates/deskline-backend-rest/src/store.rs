//! [`ScheduleStore`] over the hosted service's relational query surface.
//!
//! Filters follow the PostgREST convention: `column=op.value` query
//! parameters, repeated column keys forming a conjunction. Upserts POST
//! with `Prefer: resolution=merge-duplicates` and name their conflict
//! key via `on_conflict`.

use deskline_core::{
  attendance::AttendanceRow,
  profile::{Profile, ProfileUpsert},
  schedule::{
    DailySchedule, DailyScheduleUpsert, WeeklySchedule, WeeklyScheduleUpsert,
  },
  store::ScheduleStore,
  vacation::{DateRange, Vacation, VacationUpsert},
};
use chrono::NaiveDate;
use reqwest::RequestBuilder;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
  backend::{RestBackend, expect_ok},
  error::{Error, Result},
};

impl RestBackend {
  async fn select_rows<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
  ) -> Result<Vec<T>> {
    let resp = self.authed(req).send().await?;
    Ok(expect_ok(resp).await?.json().await?)
  }

  async fn select_one<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
  ) -> Result<Option<T>> {
    let rows = self.select_rows(req).await?;
    Ok(rows.into_iter().next())
  }

  /// POST an upsert and hand back the stored row.
  async fn upsert_returning<T, B>(
    &self,
    table: &str,
    on_conflict: &str,
    body: &B,
  ) -> Result<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    let resp = self
      .authed(self.http().post(self.table_url(table)))
      .query(&[("on_conflict", on_conflict)])
      .header("prefer", "resolution=merge-duplicates,return=representation")
      .json(body)
      .send()
      .await?;
    let rows: Vec<T> = expect_ok(resp).await?.json().await?;
    rows.into_iter().next().ok_or(Error::EmptyUpsert)
  }
}

impl ScheduleStore for RestBackend {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let query = [
      ("select", "*".to_owned()),
      ("id", format!("eq.{user_id}")),
      ("limit", "1".to_owned()),
    ];
    self
      .select_one(self.http().get(self.table_url("user_profiles")).query(&query))
      .await
  }

  async fn upsert_profile(&self, input: ProfileUpsert) -> Result<Profile> {
    self.upsert_returning("user_profiles", "id", &input).await
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    let query = [("select", "*"), ("order", "full_name.asc")];
    self
      .select_rows(self.http().get(self.table_url("user_profiles")).query(&query))
      .await
  }

  // ── Weekly schedules ──────────────────────────────────────────────────

  async fn get_weekly_schedule(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> Result<Option<WeeklySchedule>> {
    let query = [
      ("select", "*".to_owned()),
      ("user_id", format!("eq.{user_id}")),
      ("week_start", format!("eq.{week_start}")),
      ("limit", "1".to_owned()),
    ];
    self
      .select_one(
        self.http().get(self.table_url("weekly_schedules")).query(&query),
      )
      .await
  }

  async fn upsert_weekly_schedule(
    &self,
    input: WeeklyScheduleUpsert,
  ) -> Result<WeeklySchedule> {
    self
      .upsert_returning("weekly_schedules", "user_id,week_start", &input)
      .await
  }

  // ── Daily schedules ───────────────────────────────────────────────────

  async fn get_daily_schedule(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> Result<Option<DailySchedule>> {
    let query = [
      ("select", "*".to_owned()),
      ("user_id", format!("eq.{user_id}")),
      ("date", format!("eq.{date}")),
      ("limit", "1".to_owned()),
    ];
    self
      .select_one(self.http().get(self.table_url("wfh_schedules")).query(&query))
      .await
  }

  async fn upsert_daily_schedule(
    &self,
    input: DailyScheduleUpsert,
  ) -> Result<DailySchedule> {
    self.upsert_returning("wfh_schedules", "user_id,date", &input).await
  }

  async fn upsert_daily_schedules(
    &self,
    batch: Vec<DailyScheduleUpsert>,
  ) -> Result<()> {
    let resp = self
      .authed(self.http().post(self.table_url("wfh_schedules")))
      .query(&[("on_conflict", "user_id,date")])
      .header("prefer", "resolution=merge-duplicates")
      .json(&batch)
      .send()
      .await?;
    expect_ok(resp).await?;
    Ok(())
  }

  async fn daily_schedules_in_range(
    &self,
    range: DateRange,
  ) -> Result<Vec<DailySchedule>> {
    let query = [
      ("select", "*".to_owned()),
      ("date", format!("gte.{}", range.start)),
      ("date", format!("lte.{}", range.end)),
    ];
    self
      .select_rows(self.http().get(self.table_url("wfh_schedules")).query(&query))
      .await
  }

  // ── Vacations ─────────────────────────────────────────────────────────

  async fn approved_vacations_overlapping(
    &self,
    user_ids: &[Uuid],
    range: DateRange,
  ) -> Result<Vec<Vacation>> {
    if user_ids.is_empty() {
      return Ok(Vec::new());
    }
    let ids = user_ids
      .iter()
      .map(Uuid::to_string)
      .collect::<Vec<_>>()
      .join(",");
    let query = [
      ("select", "*".to_owned()),
      ("user_id", format!("in.({ids})")),
      ("status", "eq.approved".to_owned()),
      ("start_date", format!("lte.{}", range.end)),
      ("end_date", format!("gte.{}", range.start)),
    ];
    self
      .select_rows(self.http().get(self.table_url("vacations")).query(&query))
      .await
  }

  async fn current_vacation(
    &self,
    user_id: Uuid,
    from: NaiveDate,
  ) -> Result<Option<Vacation>> {
    let query = [
      ("select", "*".to_owned()),
      ("user_id", format!("eq.{user_id}")),
      ("end_date", format!("gte.{from}")),
      ("order", "start_date.asc".to_owned()),
      ("limit", "1".to_owned()),
    ];
    self
      .select_one(self.http().get(self.table_url("vacations")).query(&query))
      .await
  }

  async fn upsert_vacation(&self, input: VacationUpsert) -> Result<Vacation> {
    self.upsert_returning("vacations", "user_id,start_date", &input).await
  }

  async fn clear_vacations_from(
    &self,
    user_id: Uuid,
    from: NaiveDate,
  ) -> Result<()> {
    let query = [
      ("user_id", format!("eq.{user_id}")),
      ("end_date", format!("gte.{from}")),
    ];
    let resp = self
      .authed(self.http().delete(self.table_url("vacations")).query(&query))
      .send()
      .await?;
    expect_ok(resp).await?;
    Ok(())
  }

  async fn is_on_vacation(&self, user_id: Uuid, date: NaiveDate) -> Result<bool> {
    let query = [
      ("select", "user_id".to_owned()),
      ("user_id", format!("eq.{user_id}")),
      ("status", "eq.approved".to_owned()),
      ("start_date", format!("lte.{date}")),
      ("end_date", format!("gte.{date}")),
      ("limit", "1".to_owned()),
    ];
    let rows: Vec<serde_json::Value> = self
      .select_rows(self.http().get(self.table_url("vacations")).query(&query))
      .await?;
    Ok(!rows.is_empty())
  }

  // ── Stored procedures ─────────────────────────────────────────────────

  async fn office_attendance(
    &self,
    date: NaiveDate,
  ) -> Result<Vec<AttendanceRow>> {
    let resp = self
      .authed(self.http().post(self.rpc_url("get_office_attendance")))
      .json(&serde_json::json!({ "target_date": date }))
      .send()
      .await?;
    Ok(expect_ok(resp).await?.json().await?)
  }

  // ── Health ────────────────────────────────────────────────────────────

  async fn ping(&self) -> Result<()> {
    let query = [("select", "id"), ("limit", "1")];
    let resp = self
      .authed(self.http().get(self.table_url("user_profiles")).query(&query))
      .send()
      .await?;
    expect_ok(resp).await?;
    Ok(())
  }
}
