//! Error types for `deskline-core`.

use thiserror::Error;

/// Caller-side validation failures. These never reach the backend; the
/// offending input is rejected before any write is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("at most {max} WFH days per week, got {requested}")]
  TooManyWfhDays { max: usize, requested: usize },

  #[error("weekday index {0} is outside the Monday..Friday range (1..=5)")]
  WeekdayOutOfRange(u8),
}

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;
