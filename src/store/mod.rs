//! Persistence of daily readings keyed by `(location, reading_date)`.
//!
//! [`ReadingStore`] is the seam the run driver writes through.
//! [`PgStore`] is the production PostgreSQL implementation and
//! [`InMemoryStore`] backs dry runs and tests.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use anyhow::Result;

use crate::model::{DailyReading, Location, LocationId};

/// Find-or-create the location, then insert-or-replace the reading.
#[async_trait::async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persists `reading` for `location` as one transaction and returns the
    /// location's id.
    ///
    /// An existing reading for the same `(location, reading_date)` has every
    /// measured column replaced, including with `NULL`.
    async fn upsert(&self, location: &Location, reading: &DailyReading) -> Result<LocationId>;
}
