//! The shared HTTP backend: connection settings, token storage, and the
//! request plumbing used by both trait implementations.

use std::{sync::RwLock, time::Duration};

use chrono::Utc;
use deskline_core::auth::{AuthUser, Session};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Connection settings for the hosted service.
#[derive(Debug, Clone)]
pub struct RestConfig {
  pub base_url: String,
  /// The project's public API key. Sent as `apikey` on every request
  /// and doubles as the bearer token while no session is held.
  pub anon_key: String,
}

/// One backend serving both the auth and the store trait.
///
/// Holds the current session behind an [`RwLock`]; the lock is only
/// ever taken for short synchronous snapshots, never across an await.
pub struct RestBackend {
  http:    Client,
  config:  RestConfig,
  session: RwLock<Option<Session>>,
}

impl RestBackend {
  pub fn new(config: RestConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { http, config, session: RwLock::new(None) })
  }

  pub(crate) fn http(&self) -> &Client { &self.http }

  pub(crate) fn auth_url(&self, path: &str) -> String {
    format!(
      "{}/auth/v1{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  pub(crate) fn table_url(&self, table: &str) -> String {
    format!(
      "{}/rest/v1/{}",
      self.config.base_url.trim_end_matches('/'),
      table
    )
  }

  pub(crate) fn rpc_url(&self, function: &str) -> String {
    self.table_url(&format!("rpc/{function}"))
  }

  // ── Session storage ───────────────────────────────────────────────────────

  pub(crate) fn session_snapshot(&self) -> Option<Session> {
    self.session.read().unwrap().clone()
  }

  pub(crate) fn store_session(&self, session: Session) {
    *self.session.write().unwrap() = Some(session);
  }

  /// Adopt a previously persisted session, e.g. one a CLI saved to disk
  /// on a prior run. A later refresh rotates it in place.
  pub fn restore_session(&self, session: Session) {
    self.store_session(session);
  }

  pub(crate) fn clear_session(&self) {
    *self.session.write().unwrap() = None;
  }

  pub(crate) fn sync_user(&self, user: &AuthUser) {
    if let Some(session) = self.session.write().unwrap().as_mut() {
      session.user = user.clone();
    }
  }

  /// The held access token, or [`Error::NoSession`].
  pub(crate) fn access_token(&self) -> Result<String> {
    self
      .session_snapshot()
      .map(|s| s.access_token)
      .ok_or(Error::NoSession)
  }

  // ── Request plumbing ──────────────────────────────────────────────────────

  /// Attach the `apikey` header and a bearer token: the session's access
  /// token when one is held, the anon key otherwise.
  pub(crate) fn authed(&self, req: RequestBuilder) -> RequestBuilder {
    let bearer = self
      .session_snapshot()
      .map(|s| s.access_token)
      .unwrap_or_else(|| self.config.anon_key.clone());
    req.header("apikey", &self.config.anon_key).bearer_auth(bearer)
  }

  /// Like [`authed`](Self::authed), but requires a session.
  pub(crate) fn bearer(&self, req: RequestBuilder) -> Result<RequestBuilder> {
    let token = self.access_token()?;
    Ok(req.header("apikey", &self.config.anon_key).bearer_auth(token))
  }
}

/// Map a non-success status to [`Error::Status`], carrying whatever body
/// the service sent along.
pub(crate) async fn expect_ok(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { status, body })
}

/// Wire shape of the token endpoints' response. `expires_in` is the
/// token lifetime in seconds, converted to an absolute instant here.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionPayload {
  access_token:  String,
  refresh_token: String,
  #[serde(default)]
  expires_in:    Option<i64>,
  user:          AuthUser,
}

impl SessionPayload {
  pub(crate) fn into_session(self) -> Session {
    Session {
      expires_at:    self
        .expires_in
        .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
      access_token:  self.access_token,
      refresh_token: self.refresh_token,
      user:          self.user,
    }
  }
}
