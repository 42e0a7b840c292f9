//! # Ladder Stats
//!
//! Season statistics, leaderboards and per-player rating projections for a
//! four-race team ladder, computed from pre-aggregated JSON documents.
//!
//! ## Architecture
//!
//! - **models**: Document shapes, identifiers and derived view types
//! - **fetch**: Cached HTTP retrieval of statistics documents
//! - **source**: Document addressing and loading from a URL or a directory
//! - **calculate**: Pure transforms from documents to views
//! - **dashboard**: Per-season view assembly and chart panels
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod models;
pub mod source;

pub use models::*;

use std::time::Duration;

const DURATION_UNITS: [(char, u64); 4] = [('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// Parse a cache lifetime such as "1h", "30m", "2d" or "90s".
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (digits, unit_secs) = DURATION_UNITS
        .iter()
        .find_map(|&(suffix, secs)| s.strip_suffix(suffix).map(|n| (n, secs)))
        .unwrap_or((s, 1));

    let count: u64 = digits.trim().parse().ok()?;
    count.checked_mul(unit_secs).map(Duration::from_secs)
}
