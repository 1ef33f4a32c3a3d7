//! In-memory backend implementations for service tests.
//!
//! `MemoryBackend` implements both `AuthBackend` and `ScheduleStore`
//! over plain maps, with per-operation failure injection so retry and
//! fail-open policies can be exercised deterministically.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicU32, Ordering},
  },
};

use chrono::NaiveDate;
use deskline_core::{
  attendance::AttendanceRow,
  auth::{AuthBackend, AuthUser, Session},
  profile::{Profile, ProfileUpsert},
  realtime::{
    EventSink, FeedEvent, FeedSpec, FeedStatus, RealtimeBackend, StatusSink,
  },
  schedule::{
    DailySchedule, DailyScheduleUpsert, WeeklySchedule, WeeklyScheduleUpsert,
  },
  store::ScheduleStore,
  vacation::{DateRange, Vacation, VacationUpsert},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("no active session")]
  NoSession,

  #[error("injected failure: {0}")]
  Injected(&'static str),
}

// ─── Relational + auth backend ───────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryBackend {
  // Auth state.
  pub user:               Mutex<Option<AuthUser>>,
  /// Next N `current_user` calls fail before succeeding.
  pub fail_user_reads:    AtomicU32,
  pub fail_refresh:       AtomicBool,
  pub refresh_calls:      AtomicU32,

  // Relational state.
  pub profiles:           Mutex<Vec<Profile>>,
  pub weekly:             Mutex<HashMap<(Uuid, NaiveDate), WeeklySchedule>>,
  pub daily:              Mutex<HashMap<(Uuid, NaiveDate), DailySchedule>>,
  pub vacations:          Mutex<HashMap<(Uuid, NaiveDate), Vacation>>,
  pub attendance:         Mutex<HashMap<NaiveDate, Vec<AttendanceRow>>>,

  // Failure injection and call counters.
  pub profile_read_calls: AtomicU32,
  pub fail_profile_reads: AtomicU32,
  pub fail_list_profiles: AtomicBool,
  pub fail_weekly_upsert: AtomicBool,
  pub fail_daily_batch:   AtomicBool,
  pub fail_vacation_reads: AtomicBool,
  pub fail_attendance:    AtomicBool,
  pub fail_ping:          AtomicBool,
}

impl MemoryBackend {
  /// Install a signed-in user and return it.
  pub fn sign_in_as(&self, email: &str) -> AuthUser {
    let user = AuthUser {
      id:            Uuid::new_v4(),
      email:         email.to_string(),
      user_metadata: serde_json::json!({}),
    };
    *self.user.lock().unwrap() = Some(user.clone());
    user
  }

  /// Seed a profile row for an existing user id.
  pub fn add_profile(&self, id: Uuid, full_name: &str) -> Profile {
    let profile = Profile {
      id,
      email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
      full_name: full_name.to_string(),
      department: Some("Engineering".to_string()),
      role: None,
      avatar_url: None,
      created_at: None,
      updated_at: None,
    };
    self.profiles.lock().unwrap().push(profile.clone());
    profile
  }

  fn session_for(user: AuthUser) -> Session {
    Session {
      access_token:  "test-access".to_string(),
      refresh_token: "test-refresh".to_string(),
      expires_at:    None,
      user,
    }
  }

  /// Decrement a fail-N-times counter, reporting whether to fail.
  fn should_fail(counter: &AtomicU32) -> bool {
    counter
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
      .is_ok()
  }
}

impl AuthBackend for MemoryBackend {
  type Error = MemoryError;

  async fn sign_in_with_password(
    &self,
    email: &str,
    _password: &str,
  ) -> Result<Session, Self::Error> {
    Ok(Self::session_for(self.sign_in_as(email)))
  }

  async fn current_session(&self) -> Result<Option<Session>, Self::Error> {
    Ok(self.user.lock().unwrap().clone().map(Self::session_for))
  }

  async fn current_user(&self) -> Result<AuthUser, Self::Error> {
    if Self::should_fail(&self.fail_user_reads) {
      return Err(MemoryError::Injected("user read"));
    }
    self.user.lock().unwrap().clone().ok_or(MemoryError::NoSession)
  }

  async fn refresh_session(&self) -> Result<Session, Self::Error> {
    self.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_refresh.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected("refresh"));
    }
    let user =
      self.user.lock().unwrap().clone().ok_or(MemoryError::NoSession)?;
    Ok(Self::session_for(user))
  }

  async fn sign_out(&self) -> Result<(), Self::Error> {
    *self.user.lock().unwrap() = None;
    Ok(())
  }
}

impl ScheduleStore for MemoryBackend {
  type Error = MemoryError;

  async fn get_profile(
    &self,
    user_id: Uuid,
  ) -> Result<Option<Profile>, Self::Error> {
    self.profile_read_calls.fetch_add(1, Ordering::SeqCst);
    if Self::should_fail(&self.fail_profile_reads) {
      return Err(MemoryError::Injected("profile read"));
    }
    Ok(
      self
        .profiles
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.id == user_id)
        .cloned(),
    )
  }

  async fn upsert_profile(
    &self,
    input: ProfileUpsert,
  ) -> Result<Profile, Self::Error> {
    let profile = Profile {
      id:         input.id,
      email:      input.email,
      full_name:  input.full_name,
      department: Some(input.department),
      role:       Some(input.role),
      avatar_url: Some(input.avatar_url),
      created_at: None,
      updated_at: None,
    };
    let mut profiles = self.profiles.lock().unwrap();
    profiles.retain(|p| p.id != profile.id);
    profiles.push(profile.clone());
    Ok(profile)
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>, Self::Error> {
    if self.fail_list_profiles.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected("list profiles"));
    }
    let mut profiles = self.profiles.lock().unwrap().clone();
    profiles.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    Ok(profiles)
  }

  async fn get_weekly_schedule(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> Result<Option<WeeklySchedule>, Self::Error> {
    Ok(self.weekly.lock().unwrap().get(&(user_id, week_start)).cloned())
  }

  async fn upsert_weekly_schedule(
    &self,
    input: WeeklyScheduleUpsert,
  ) -> Result<WeeklySchedule, Self::Error> {
    if self.fail_weekly_upsert.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected("weekly upsert"));
    }
    let record = WeeklySchedule {
      user_id:      input.user_id,
      week_start:   input.week_start,
      year:         input.year,
      week_number:  input.week_number,
      wfh_days:     input.wfh_days,
      is_submitted: input.is_submitted,
      submitted_at: Some(input.submitted_at),
    };
    self
      .weekly
      .lock()
      .unwrap()
      .insert((record.user_id, record.week_start), record.clone());
    Ok(record)
  }

  async fn get_daily_schedule(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> Result<Option<DailySchedule>, Self::Error> {
    Ok(self.daily.lock().unwrap().get(&(user_id, date)).cloned())
  }

  async fn upsert_daily_schedule(
    &self,
    input: DailyScheduleUpsert,
  ) -> Result<DailySchedule, Self::Error> {
    let record = DailySchedule {
      user_id: input.user_id,
      date:    input.date,
      is_wfh:  input.is_wfh,
      notes:   input.notes,
    };
    self
      .daily
      .lock()
      .unwrap()
      .insert((record.user_id, record.date), record.clone());
    Ok(record)
  }

  async fn upsert_daily_schedules(
    &self,
    batch: Vec<DailyScheduleUpsert>,
  ) -> Result<(), Self::Error> {
    if self.fail_daily_batch.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected("daily batch upsert"));
    }
    let mut daily = self.daily.lock().unwrap();
    for input in batch {
      daily.insert(
        (input.user_id, input.date),
        DailySchedule {
          user_id: input.user_id,
          date:    input.date,
          is_wfh:  input.is_wfh,
          notes:   input.notes,
        },
      );
    }
    Ok(())
  }

  async fn daily_schedules_in_range(
    &self,
    range: DateRange,
  ) -> Result<Vec<DailySchedule>, Self::Error> {
    Ok(
      self
        .daily
        .lock()
        .unwrap()
        .values()
        .filter(|d| d.date >= range.start && d.date <= range.end)
        .cloned()
        .collect(),
    )
  }

  async fn approved_vacations_overlapping(
    &self,
    user_ids: &[Uuid],
    range: DateRange,
  ) -> Result<Vec<Vacation>, Self::Error> {
    if self.fail_vacation_reads.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected("vacation read"));
    }
    Ok(
      self
        .vacations
        .lock()
        .unwrap()
        .values()
        .filter(|v| {
          matches!(v.status, deskline_core::vacation::VacationStatus::Approved)
            && user_ids.contains(&v.user_id)
            && v.overlaps(range)
        })
        .cloned()
        .collect(),
    )
  }

  async fn current_vacation(
    &self,
    user_id: Uuid,
    from: NaiveDate,
  ) -> Result<Option<Vacation>, Self::Error> {
    Ok(
      self
        .vacations
        .lock()
        .unwrap()
        .values()
        .filter(|v| v.user_id == user_id && v.end_date >= from)
        .min_by_key(|v| v.start_date)
        .cloned(),
    )
  }

  async fn upsert_vacation(
    &self,
    input: VacationUpsert,
  ) -> Result<Vacation, Self::Error> {
    let record = Vacation {
      user_id:    input.user_id,
      start_date: input.start_date,
      end_date:   input.end_date,
      status:     input.status,
      notes:      input.notes,
    };
    self
      .vacations
      .lock()
      .unwrap()
      .insert((record.user_id, record.start_date), record.clone());
    Ok(record)
  }

  async fn clear_vacations_from(
    &self,
    user_id: Uuid,
    from: NaiveDate,
  ) -> Result<(), Self::Error> {
    self
      .vacations
      .lock()
      .unwrap()
      .retain(|_, v| !(v.user_id == user_id && v.end_date >= from));
    Ok(())
  }

  async fn is_on_vacation(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> Result<bool, Self::Error> {
    if self.fail_vacation_reads.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected("vacation read"));
    }
    Ok(self.vacations.lock().unwrap().values().any(|v| {
      v.user_id == user_id
        && matches!(v.status, deskline_core::vacation::VacationStatus::Approved)
        && v.start_date <= date
        && v.end_date >= date
    }))
  }

  async fn office_attendance(
    &self,
    date: NaiveDate,
  ) -> Result<Vec<AttendanceRow>, Self::Error> {
    if self.fail_attendance.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected("attendance rpc"));
    }
    Ok(
      self
        .attendance
        .lock()
        .unwrap()
        .get(&date)
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn ping(&self) -> Result<(), Self::Error> {
    if self.fail_ping.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected("ping"));
    }
    Ok(())
  }
}

// ─── Realtime backend ────────────────────────────────────────────────────────

/// Counting realtime transport. Handles are sequential from 1 in open
/// order; stored sinks let tests push events and status transitions.
#[derive(Default)]
pub struct MemoryRealtime {
  next_handle: AtomicU32,
  pub opened:  AtomicU32,
  pub closed:  AtomicU32,
  events:      Mutex<HashMap<u32, EventSink>>,
  statuses:    Mutex<HashMap<u32, StatusSink>>,
}

impl MemoryRealtime {
  pub fn emit_status(&self, handle: u32, status: FeedStatus) {
    if let Some(sink) = self.statuses.lock().unwrap().get(&handle) {
      sink(status);
    }
  }

  pub fn emit_event(&self, handle: u32, event: FeedEvent) {
    if let Some(sink) = self.events.lock().unwrap().get(&handle) {
      sink(event);
    }
  }
}

impl RealtimeBackend for MemoryRealtime {
  type Error = MemoryError;
  type Handle = u32;

  async fn open(
    &self,
    _spec: &FeedSpec,
    events: EventSink,
    status: StatusSink,
  ) -> Result<Self::Handle, Self::Error> {
    let handle = self.next_handle.fetch_add(1, Ordering::SeqCst) + 1;
    self.opened.fetch_add(1, Ordering::SeqCst);
    status(FeedStatus::Subscribed);
    self.events.lock().unwrap().insert(handle, events);
    self.statuses.lock().unwrap().insert(handle, status);
    Ok(handle)
  }

  async fn close(&self, handle: Self::Handle) -> Result<(), Self::Error> {
    self.closed.fetch_add(1, Ordering::SeqCst);
    self.events.lock().unwrap().remove(&handle);
    self.statuses.lock().unwrap().remove(&handle);
    Ok(())
  }
}
