//! Session access and profile retrieval.
//!
//! The session accessor wraps the auth backend with one level of
//! refresh-and-retry; the profile fetch adds a bounded linear-backoff
//! retry loop over the store. Both surface the *original* error when
//! recovery fails, so refresh and retry failures never mask the root
//! cause.

use std::{
  sync::{Arc, RwLock},
  time::Duration,
};

use deskline_core::{
  auth::{AuthBackend, AuthUser, Session},
  profile::{Profile, ProfileUpsert},
  store::ScheduleStore,
};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Attempts made against the store for a single profile lookup.
const PROFILE_FETCH_ATTEMPTS: u32 = 3;

/// Caller-supplied profile fields for an upsert. Anything left `None`
/// falls back to the identity provider's metadata, then to empty.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
  pub full_name:  Option<String>,
  pub department: Option<String>,
  pub role:       Option<String>,
  pub avatar_url: Option<String>,
}

/// Auth manager: session resolution, sign-in/out, and the caller's own
/// profile row.
///
/// Holds a best-effort cache of the last successfully resolved user for
/// synchronous checks. The cache is never a source of truth for
/// authorization; privileged paths go through
/// [`current_user`](Self::current_user) again.
pub struct SessionManager<A, S> {
  auth:   Arc<A>,
  store:  Arc<S>,
  cached: RwLock<Option<AuthUser>>,
}

impl<A, S> SessionManager<A, S>
where
  A: AuthBackend,
  S: ScheduleStore,
{
  pub fn new(auth: Arc<A>, store: Arc<S>) -> Self {
    Self {
      auth,
      store,
      cached: RwLock::new(None),
    }
  }

  // ── Sign-in / sign-out ────────────────────────────────────────────────

  pub async fn sign_in_with_password(
    &self,
    email: &str,
    password: &str,
  ) -> Result<Session> {
    let session = self
      .auth
      .sign_in_with_password(email, password)
      .await
      .map_err(|e| {
        warn!(error = %e, "sign-in failed");
        Error::auth(e)
      })?;
    self.remember(session.user.clone());
    Ok(session)
  }

  pub async fn sign_out(&self) -> Result<()> {
    self.auth.sign_out().await.map_err(|e| {
      warn!(error = %e, "sign-out failed");
      Error::auth(e)
    })?;
    *self.cached.write().expect("session cache poisoned") = None;
    Ok(())
  }

  // ── Session accessor ──────────────────────────────────────────────────

  /// Resolve the current user, refreshing the session once on failure.
  ///
  /// If the refresh or the post-refresh retry also fails, the original
  /// read error is surfaced; the recovery errors are only logged.
  pub async fn current_user(&self) -> Result<AuthUser> {
    let original = match self.auth.current_user().await {
      Ok(user) => {
        self.remember(user.clone());
        return Ok(user);
      }
      Err(err) => err,
    };

    warn!(error = %original, "user lookup failed, refreshing session");
    if let Err(refresh_err) = self.auth.refresh_session().await {
      warn!(error = %refresh_err, "session refresh failed");
      return Err(Error::auth(original));
    }

    match self.auth.current_user().await {
      Ok(user) => {
        info!("session refreshed");
        self.remember(user.clone());
        Ok(user)
      }
      Err(retry_err) => {
        warn!(error = %retry_err, "user lookup failed after refresh");
        Err(Error::auth(original))
      }
    }
  }

  /// The last successfully resolved user, if any. Best-effort only.
  pub fn cached_user(&self) -> Option<AuthUser> {
    self.cached.read().expect("session cache poisoned").clone()
  }

  /// Synchronous "is a principal currently known" check against the
  /// cache.
  pub fn is_authenticated(&self) -> bool {
    self.cached_user().is_some()
  }

  /// The pure authorization check: a valid session exists and its user
  /// resolves. Navigation on failure is the caller's policy.
  pub async fn check_auth(&self) -> bool {
    match self.auth.current_session().await {
      Ok(Some(_)) => {}
      Ok(None) => {
        info!("no active session");
        return false;
      }
      Err(err) => {
        warn!(error = %err, "session check failed");
        return false;
      }
    }
    self.current_user().await.is_ok()
  }

  // ── Profile ───────────────────────────────────────────────────────────

  /// Fetch the caller's profile row with up to three attempts and
  /// linear backoff (1s, 2s) between them.
  ///
  /// A missing row is a successful `Ok(None)` outcome and is not
  /// retried; only backend failures are.
  pub async fn fetch_profile(&self) -> Result<Option<Profile>> {
    let user = self.current_user().await?;

    let mut attempt = 0;
    loop {
      attempt += 1;
      match self.store.get_profile(user.id).await {
        Ok(profile) => return Ok(profile),
        Err(err) => {
          warn!(attempt, error = %err, "profile lookup failed");
          if attempt == PROFILE_FETCH_ATTEMPTS {
            return Err(Error::backend(err));
          }
          tokio::time::sleep(Duration::from_millis(1000 * u64::from(attempt)))
            .await;
        }
      }
    }
  }

  /// Create or update the caller's profile row. Identity fields come
  /// from the session; everything else from the draft, falling back to
  /// provider metadata.
  pub async fn upsert_profile(&self, draft: ProfileDraft) -> Result<Profile> {
    let user = self.current_user().await?;

    let metadata_string =
      |key: &str| user.metadata_str(key).map(str::to_owned);

    let input = ProfileUpsert {
      id:         user.id,
      email:      user.email.clone(),
      full_name:  draft
        .full_name
        .or_else(|| metadata_string("full_name"))
        .unwrap_or_default(),
      department: draft.department.unwrap_or_default(),
      role:       draft.role.unwrap_or_default(),
      avatar_url: draft
        .avatar_url
        .or_else(|| metadata_string("avatar_url"))
        .unwrap_or_default(),
    };

    self.store.upsert_profile(input).await.map_err(Error::backend)
  }

  fn remember(&self, user: AuthUser) {
    *self.cached.write().expect("session cache poisoned") = Some(user);
  }
}
