//! Traits and payload types for the two observation sources.
//!
//! Implementations live under [`crate::infra`]; the run driver only sees the
//! traits, so tests can substitute canned payloads.

pub mod air_quality;
pub mod weather;

use chrono::NaiveDate;

/// Which slice of time a source is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWindow {
    /// Conditions right now / the forecast for today.
    Current,
    /// One past calendar day (UTC for air quality, local for weather).
    Day(NaiveDate),
}
