//! User profiles — the principal's directory row.
//!
//! Identity fields (`id`, `email`) are immutable once created;
//! `department` and `role` change via profile upsert. This system never
//! deletes a profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the `user_profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  /// Matches the auth backend's user id.
  pub id:         Uuid,
  pub email:      String,
  pub full_name:  String,
  pub department: Option<String>,
  pub role:       Option<String>,
  pub avatar_url: Option<String>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

/// Input to [`crate::store::ScheduleStore::upsert_profile`].
///
/// All fields are written on every upsert; absent caller values default
/// to empty strings rather than leaving columns untouched.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpsert {
  pub id:         Uuid,
  pub email:      String,
  pub full_name:  String,
  pub department: String,
  pub role:       String,
  pub avatar_url: String,
}
