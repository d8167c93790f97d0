//! `callie-domain`: shared types for the Callie agent dashboard.
//!
//! Holds the canonical agent record, the typed mutation lens used by the
//! editor's reducer, the JSON overlay used during hydration, and the
//! cross-crate error, trace and configuration types.

pub mod agent;
pub mod config;
pub mod error;
pub mod overlay;
pub mod trace;
