use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use super::ReadingStore;
use crate::model::{DailyReading, Location, LocationId};

#[derive(Default)]
struct Tables {
    locations: Vec<(LocationId, Location)>,
    readings: BTreeMap<(LocationId, NaiveDate), DailyReading>,
}

/// Process-local store with the same upsert semantics as [`PgStore`](super::PgStore).
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn location_count(&self) -> usize {
        self.tables().locations.len()
    }

    pub fn reading_count(&self) -> usize {
        self.tables().readings.len()
    }

    pub fn location_id(&self, city: &str, country: &str) -> Option<LocationId> {
        self.tables()
            .locations
            .iter()
            .find(|(_, l)| l.city == city && l.country == country)
            .map(|(id, _)| *id)
    }

    pub fn reading(&self, location_id: LocationId, date: NaiveDate) -> Option<DailyReading> {
        self.tables().readings.get(&(location_id, date)).cloned()
    }

    /// All readings ordered by location id, then date.
    pub fn readings(&self) -> Vec<(LocationId, DailyReading)> {
        self.tables()
            .readings
            .iter()
            .map(|((id, _), r)| (*id, r.clone()))
            .collect()
    }
}

#[async_trait]
impl ReadingStore for InMemoryStore {
    async fn upsert(&self, location: &Location, reading: &DailyReading) -> Result<LocationId> {
        let mut tables = self.tables();

        let existing = tables
            .locations
            .iter()
            .find(|(_, l)| l.city == location.city && l.country == location.country)
            .map(|(id, _)| *id);

        let location_id = match existing {
            Some(id) => id,
            None => {
                let id = tables.locations.len() as LocationId + 1;
                tables.locations.push((id, location.clone()));
                debug!(city = %location.city, location_id = id, "Created location");
                id
            }
        };

        tables
            .readings
            .insert((location_id, reading.reading_date), reading.clone());
        Ok(location_id)
    }
}
