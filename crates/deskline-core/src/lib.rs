//! Core types and trait definitions for the Deskline scheduling client.
//!
//! This crate is deliberately free of HTTP and transport dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod auth;
pub mod error;
pub mod profile;
pub mod realtime;
pub mod schedule;
pub mod store;
pub mod vacation;
pub mod week;

pub use error::{Result, ValidationError};
