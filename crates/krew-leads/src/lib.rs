//! Lead-capture backend for the Neighborhood Krew marketing site.
//!
//! Everything with real state lives here: the quote funnel wizard and its
//! scoring heuristic, the collection store backing leads, newsletter
//! signups, gallery photos and webhook configuration, the CSV export used
//! by the admin panel, and the best-effort webhook dispatcher.

pub mod config;
pub mod error;
pub mod export;
pub mod funnel;
pub mod gallery;
pub mod newsletter;
pub mod storage;
pub mod telemetry;
pub mod webhook;
