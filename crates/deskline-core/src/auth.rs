//! The `AuthBackend` trait and session types.
//!
//! Implemented by transport backends (e.g. `deskline-backend-rest`).
//! Higher layers (`deskline-client`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated identity as reported by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
  pub id:            Uuid,
  pub email:         String,
  /// Free-form metadata supplied by the identity provider
  /// (e.g. `full_name`, `avatar_url`).
  #[serde(default)]
  pub user_metadata: serde_json::Value,
}

impl AuthUser {
  /// Look up a string field in the provider metadata.
  pub fn metadata_str(&self, key: &str) -> Option<&str> {
    self.user_metadata.get(key).and_then(|v| v.as_str())
  }
}

/// An access/refresh token pair with its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub access_token:  String,
  pub refresh_token: String,
  pub expires_at:    Option<DateTime<Utc>>,
  pub user:          AuthUser,
}

/// Abstraction over the hosted auth service.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait AuthBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Exchange email/password credentials for a session.
  fn sign_in_with_password<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'a;

  /// The currently held session, if any. Does not hit the network on
  /// backends that cache tokens locally.
  fn current_session(
    &self,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Resolve the current user against the auth service. Fails when no
  /// valid session exists.
  fn current_user(
    &self,
  ) -> impl Future<Output = Result<AuthUser, Self::Error>> + Send + '_;

  /// Exchange the refresh token for a fresh session.
  fn refresh_session(
    &self,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Invalidate the current session.
  fn sign_out(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
