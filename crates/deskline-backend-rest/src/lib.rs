//! REST backend for the deskline scheduling client.
//!
//! Implements [`deskline_core::auth::AuthBackend`] against the hosted
//! service's token endpoints (`/auth/v1`) and
//! [`deskline_core::store::ScheduleStore`] against its relational query
//! surface (`/rest/v1`, PostgREST conventions: `eq.`/`gte.`/`lte.`
//! column filters, `Prefer: resolution=merge-duplicates` upserts).

mod auth;
mod backend;
mod store;

pub mod error;

pub use backend::{RestBackend, RestConfig};
pub use error::{Error, Result};
