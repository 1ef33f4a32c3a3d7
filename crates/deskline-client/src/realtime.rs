//! Change-feed subscription bookkeeping.
//!
//! The registry tracks named, active feeds so they can be individually
//! or collectively torn down. Each entry keeps its durable descriptor
//! (spec plus event sink), so [`RealtimeRegistry::reconnect_all`] can
//! rebuild every feed instead of dropping callbacks on the floor.
//!
//! Known limitations, kept deliberately: re-subscribing under an
//! already-registered name produces two independent entries (no dedup),
//! and the connectivity flag reflects only the most recently reported
//! feed acknowledgment, not a conjunction across all feeds.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, Ordering},
};

use deskline_core::realtime::{
  EventSink, FeedSpec, FeedStatus, RealtimeBackend, StatusSink,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Snapshot of the registry for display.
#[derive(Debug, Clone)]
pub struct SubscriptionStatus {
  pub connected:    bool,
  pub active_names: Vec<String>,
  pub count:        usize,
}

struct FeedEntry<H> {
  name:   String,
  spec:   FeedSpec,
  events: EventSink,
  handle: H,
}

/// Registry of live change-feed subscriptions over a realtime backend.
pub struct RealtimeRegistry<R: RealtimeBackend> {
  backend:   Arc<R>,
  entries:   Mutex<Vec<FeedEntry<R::Handle>>>,
  connected: Arc<AtomicBool>,
}

impl<R: RealtimeBackend> RealtimeRegistry<R> {
  pub fn new(backend: Arc<R>) -> Self {
    Self {
      backend,
      entries: Mutex::new(Vec::new()),
      connected: Arc::new(AtomicBool::new(false)),
    }
  }

  // ── Subscribe variants ────────────────────────────────────────────────

  /// Office-wide feed over `wfh_schedules` and `user_profiles`.
  pub async fn subscribe_office_attendance(
    &self,
    events: EventSink,
  ) -> Result<String> {
    self.open_entry(FeedSpec::OfficeAttendance, events).await
  }

  /// Office-wide feed over `weekly_schedules`.
  pub async fn subscribe_weekly_schedules(
    &self,
    events: EventSink,
  ) -> Result<String> {
    self.open_entry(FeedSpec::WeeklySchedules, events).await
  }

  /// Both schedule tables, filtered to one principal.
  pub async fn subscribe_user_schedules(
    &self,
    user_id: Uuid,
    events: EventSink,
  ) -> Result<String> {
    self.open_entry(FeedSpec::UserSchedules { user_id }, events).await
  }

  /// Profile changes filtered to one department.
  pub async fn subscribe_team_updates(
    &self,
    department: &str,
    events: EventSink,
  ) -> Result<String> {
    self
      .open_entry(
        FeedSpec::TeamUpdates { department: department.to_string() },
        events,
      )
      .await
  }

  /// A presence channel; `meta` is tracked alongside the principal once
  /// the feed confirms.
  pub async fn subscribe_presence(
    &self,
    channel: &str,
    user_id: Uuid,
    meta: serde_json::Value,
    events: EventSink,
  ) -> Result<String> {
    self
      .open_entry(
        FeedSpec::Presence { channel: channel.to_string(), user_id, meta },
        events,
      )
      .await
  }

  /// Open a feed for `spec` and record it. Returns the registry name
  /// the entry was recorded under.
  async fn open_entry(&self, spec: FeedSpec, events: EventSink) -> Result<String> {
    let name = spec.default_name();

    let connected = Arc::clone(&self.connected);
    let status: StatusSink = Arc::new(move |status: FeedStatus| {
      connected.store(status.is_subscribed(), Ordering::Relaxed);
    });

    let handle = self
      .backend
      .open(&spec, Arc::clone(&events), status)
      .await
      .map_err(Error::backend)?;

    self
      .entries
      .lock()
      .expect("registry lock poisoned")
      .push(FeedEntry { name: name.clone(), spec, events, handle });

    info!(name, "feed subscribed");
    Ok(name)
  }

  // ── Teardown ──────────────────────────────────────────────────────────

  /// Tear down the first entry registered under `name`. A name with no
  /// entry is a no-op.
  pub async fn unsubscribe(&self, name: &str) -> Result<()> {
    let entry = {
      let mut entries = self.entries.lock().expect("registry lock poisoned");
      entries
        .iter()
        .position(|e| e.name == name)
        .map(|i| entries.remove(i))
    };

    if let Some(entry) = entry {
      self.backend.close(entry.handle).await.map_err(Error::backend)?;
      info!(name, "feed unsubscribed");
    }
    Ok(())
  }

  /// Tear down every registered feed and reset the connectivity flag.
  /// Teardown failures are logged, not propagated, so one stuck feed
  /// cannot keep the rest alive.
  pub async fn unsubscribe_all(&self) {
    let drained: Vec<_> = {
      let mut entries = self.entries.lock().expect("registry lock poisoned");
      entries.drain(..).collect()
    };

    for entry in drained {
      if let Err(err) = self.backend.close(entry.handle).await {
        warn!(name = %entry.name, error = %err, "feed teardown failed");
      } else {
        info!(name = %entry.name, "feed unsubscribed");
      }
    }
    self.connected.store(false, Ordering::Relaxed);
  }

  /// Tear everything down, then re-open every feed from its stored
  /// descriptor. Callbacks survive the round trip.
  pub async fn reconnect_all(&self) -> Result<()> {
    let drained: Vec<_> = {
      let mut entries = self.entries.lock().expect("registry lock poisoned");
      entries.drain(..).collect()
    };
    self.connected.store(false, Ordering::Relaxed);

    let mut descriptors = Vec::with_capacity(drained.len());
    for entry in drained {
      if let Err(err) = self.backend.close(entry.handle).await {
        warn!(name = %entry.name, error = %err, "feed teardown failed");
      }
      descriptors.push((entry.spec, entry.events));
    }

    for (spec, events) in descriptors {
      self.open_entry(spec, events).await?;
    }
    Ok(())
  }

  // ── Status ────────────────────────────────────────────────────────────

  pub fn status(&self) -> SubscriptionStatus {
    let entries = self.entries.lock().expect("registry lock poisoned");
    SubscriptionStatus {
      connected:    self.connected.load(Ordering::Relaxed),
      active_names: entries.iter().map(|e| e.name.clone()).collect(),
      count:        entries.len(),
    }
  }
}
