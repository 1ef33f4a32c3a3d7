//! [`AuthBackend`] over the hosted service's token endpoints.

use deskline_core::auth::{AuthBackend, AuthUser, Session};
use tracing::debug;

use crate::{
  backend::{RestBackend, SessionPayload, expect_ok},
  error::{Error, Result},
};

impl AuthBackend for RestBackend {
  type Error = Error;

  async fn sign_in_with_password(
    &self,
    email: &str,
    password: &str,
  ) -> Result<Session> {
    let resp = self
      .authed(self.http().post(self.auth_url("/token")))
      .query(&[("grant_type", "password")])
      .json(&serde_json::json!({ "email": email, "password": password }))
      .send()
      .await?;
    let payload: SessionPayload = expect_ok(resp).await?.json().await?;

    let session = payload.into_session();
    debug!(user_id = %session.user.id, "signed in");
    self.store_session(session.clone());
    Ok(session)
  }

  async fn current_session(&self) -> Result<Option<Session>> {
    Ok(self.session_snapshot())
  }

  async fn current_user(&self) -> Result<AuthUser> {
    let resp = self
      .bearer(self.http().get(self.auth_url("/user")))?
      .send()
      .await?;
    let user: AuthUser = expect_ok(resp).await?.json().await?;
    self.sync_user(&user);
    Ok(user)
  }

  async fn refresh_session(&self) -> Result<Session> {
    let refresh_token = self
      .session_snapshot()
      .map(|s| s.refresh_token)
      .ok_or(Error::NoSession)?;

    let resp = self
      .authed(self.http().post(self.auth_url("/token")))
      .query(&[("grant_type", "refresh_token")])
      .json(&serde_json::json!({ "refresh_token": refresh_token }))
      .send()
      .await?;
    let payload: SessionPayload = expect_ok(resp).await?.json().await?;

    let session = payload.into_session();
    debug!(user_id = %session.user.id, "session refreshed");
    self.store_session(session.clone());
    Ok(session)
  }

  async fn sign_out(&self) -> Result<()> {
    let resp = self
      .bearer(self.http().post(self.auth_url("/logout")))?
      .send()
      .await?;
    expect_ok(resp).await?;
    self.clear_session();
    Ok(())
  }
}
