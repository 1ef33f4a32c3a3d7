//! Error type for `deskline-backend-rest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An operation that needs a bearer token was called while no session
  /// is held. Detected locally, never hits the network.
  #[error("no active session")]
  NoSession,

  #[error("http transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The service answered with a non-success status.
  #[error("backend returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  /// An upsert asked for `return=representation` but got zero rows back.
  #[error("upsert returned no representation")]
  EmptyUpsert,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
