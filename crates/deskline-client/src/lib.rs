//! Service layer for the Deskline scheduling client.
//!
//! Three dependency-injected services over the `deskline-core` backend
//! traits: [`SessionManager`] (auth and profile access),
//! [`ScheduleService`] (schedule and vacation CRUD plus the weekly
//! attendance aggregation), and [`RealtimeRegistry`] (change-feed
//! subscription bookkeeping). Construct each with its backend handles
//! passed in; there are no process-wide singletons, so isolated test
//! instances are cheap.

pub mod error;
pub mod realtime;
pub mod schedule;
pub mod session;

pub use error::{Error, Result};
pub use realtime::{RealtimeRegistry, SubscriptionStatus};
pub use schedule::ScheduleService;
pub use session::{ProfileDraft, SessionManager};

#[cfg(test)]
mod testutil;

#[cfg(test)]
mod tests;
