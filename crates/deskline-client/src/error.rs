//! Service-level error type.
//!
//! Row-absent lookups are `Ok(None)` everywhere, never errors.
//! Validation failures come typed from `deskline-core`; auth and
//! backend failures carry the boxed source error from whichever
//! backend implementation is plugged in.

use deskline_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No session, an invalid session, or an auth service failure.
  #[error("authentication error: {0}")]
  Auth(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A query or stored-procedure failure in the relational backend.
  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error(transparent)]
  Validation(#[from] ValidationError),
}

impl Error {
  pub(crate) fn auth<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Auth(Box::new(err))
  }

  pub(crate) fn backend<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Backend(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
