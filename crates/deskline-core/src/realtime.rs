//! The `RealtimeBackend` trait and change-feed types.
//!
//! The hosted service's websocket transport is an external collaborator;
//! this crate only defines the seam. Feeds are fire-and-forget: opening
//! one returns a handle immediately, and connection confirmation arrives
//! asynchronously through the status sink.

use std::{future::Future, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Feed descriptors ────────────────────────────────────────────────────────

/// What a feed watches. Durable — kept by the subscription registry so a
/// feed can be re-opened after a teardown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedSpec {
  /// Changes to `wfh_schedules` and `user_profiles`, office-wide.
  OfficeAttendance,
  /// Changes to `weekly_schedules`, office-wide.
  WeeklySchedules,
  /// Changes to both schedule tables filtered to one principal.
  UserSchedules { user_id: Uuid },
  /// Changes to `user_profiles` filtered to one department.
  TeamUpdates { department: String },
  /// A presence channel; `meta` is tracked alongside the principal.
  Presence {
    channel: String,
    user_id: Uuid,
    meta:    serde_json::Value,
  },
}

impl FeedSpec {
  /// The registry name a feed of this spec is recorded under.
  pub fn default_name(&self) -> String {
    match self {
      Self::OfficeAttendance => "office-attendance".to_string(),
      Self::WeeklySchedules => "weekly-schedules".to_string(),
      Self::UserSchedules { user_id } => format!("user-schedules-{user_id}"),
      Self::TeamUpdates { department } => format!("team-updates-{department}"),
      Self::Presence { channel, .. } => format!("presence-{channel}"),
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
  Insert,
  Update,
  Delete,
}

/// A table-change notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableChange {
  pub table:   String,
  pub kind:    ChangeKind,
  /// The new row, as loosely-typed JSON; deletes carry the old key only.
  pub row:     serde_json::Value,
  pub old_row: Option<serde_json::Value>,
}

/// A presence-channel notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresenceEvent {
  Sync { state: serde_json::Value },
  Join { key: String, presences: serde_json::Value },
  Leave { key: String, presences: serde_json::Value },
}

/// Everything a feed can deliver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedEvent {
  Change(TableChange),
  Presence(PresenceEvent),
}

/// Subscribe/teardown acknowledgment reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
  Subscribed,
  Closed,
  Errored,
}

impl FeedStatus {
  pub fn is_subscribed(&self) -> bool { matches!(self, Self::Subscribed) }
}

/// Callback invoked for every event a feed delivers.
pub type EventSink = Arc<dyn Fn(FeedEvent) + Send + Sync>;

/// Callback invoked for feed status transitions.
pub type StatusSink = Arc<dyn Fn(FeedStatus) + Send + Sync>;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the hosted change-feed transport.
pub trait RealtimeBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Opaque live-connection handle; returned by [`open`](Self::open)
  /// and consumed by [`close`](Self::close).
  type Handle: Send;

  /// Open one logical feed. Returns as soon as the handle exists;
  /// `status` is invoked later with the subscribe acknowledgment.
  fn open<'a>(
    &'a self,
    spec: &'a FeedSpec,
    events: EventSink,
    status: StatusSink,
  ) -> impl Future<Output = Result<Self::Handle, Self::Error>> + Send + 'a;

  /// Tear down a feed previously returned by [`open`](Self::open).
  fn close(
    &self,
    handle: Self::Handle,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
