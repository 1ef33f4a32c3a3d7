//! Vacation records and the overlap computation.
//!
//! A vacation is a closed date interval `[start_date, end_date]` during
//! which the principal is absent regardless of any WFH/office schedule
//! entry. Overlap with a query range `[qs, qe]` holds iff
//! `start_date <= qe && end_date >= qs`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Date range ──────────────────────────────────────────────────────────────

/// A closed calendar-date interval, inclusive of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Self { Self { start, end } }

  /// The Monday..Friday range of the week starting at `week_start`.
  pub fn workweek_of(week_start: NaiveDate) -> Self {
    Self {
      start: week_start,
      end:   week_start + chrono::Days::new(4),
    }
  }

  /// Every calendar date in the range, inclusive of both ends.
  pub fn days(self) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(self.start), |d| d.succ_opt())
      .take_while(move |d| *d <= self.end)
  }
}

// ─── Vacation record ─────────────────────────────────────────────────────────

/// Approval state of a vacation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VacationStatus {
  Approved,
  Pending,
  Rejected,
}

/// A persisted vacation interval. Keyed by `(user_id, start_date)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vacation {
  pub user_id:    Uuid,
  pub start_date: NaiveDate,
  /// Inclusive.
  pub end_date:   NaiveDate,
  pub status:     VacationStatus,
  #[serde(default)]
  pub notes:      Option<String>,
}

/// Input to [`crate::store::ScheduleStore::upsert_vacation`].
#[derive(Debug, Clone, Serialize)]
pub struct VacationUpsert {
  pub user_id:    Uuid,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  pub status:     VacationStatus,
  pub notes:      Option<String>,
}

impl Vacation {
  /// Closed-interval overlap test against a query range.
  pub fn overlaps(&self, range: DateRange) -> bool {
    self.start_date <= range.end && self.end_date >= range.start
  }

  /// The portion of this vacation that falls inside `range`, or `None`
  /// if the two intervals are disjoint.
  pub fn clip(&self, range: DateRange) -> Option<DateRange> {
    self.overlaps(range).then(|| {
      DateRange::new(
        self.start_date.max(range.start),
        self.end_date.min(range.end),
      )
    })
  }
}

// ─── Overlap map ─────────────────────────────────────────────────────────────

/// Per-principal set of vacation dates within a query range.
///
/// Principals with no overlapping vacation are simply absent; an absent
/// key means "not on vacation any day in range".
pub type VacationMap = BTreeMap<Uuid, BTreeSet<NaiveDate>>;

/// Build the per-principal vacation-date map for `range`.
///
/// Each record is clipped to the range and every day of the clipped
/// interval is enumerated. The set representation deduplicates dates
/// covered by more than one overlapping record for the same principal.
pub fn status_map(records: &[Vacation], range: DateRange) -> VacationMap {
  let mut map = VacationMap::new();
  for vacation in records {
    let Some(clipped) = vacation.clip(range) else {
      continue;
    };
    map
      .entry(vacation.user_id)
      .or_default()
      .extend(clipped.days());
  }
  map
}
