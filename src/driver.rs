//! Sequential run loop: for each unit of work fetch air quality, fetch
//! weather, merge, and upsert.
//!
//! A unit of work is one location (current mode) or one location on one
//! past date (backfill mode). Units are independent; a failure in one is
//! logged and the run moves on.

use std::time::Duration;

use chrono::{Days, NaiveDate};
use tracing::{Instrument, debug, error, info, warn};

use crate::merge::merge;
use crate::model::{Location, LocationId};
use crate::services::FetchWindow;
use crate::services::air_quality::AirQualityApi;
use crate::services::weather::WeatherApi;
use crate::store::ReadingStore;

/// Selects both the fetch window and, through the payload it yields, the
/// merge strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Today's conditions for every location.
    Current,
    /// The `days` days before today, oldest first, with `pause` between
    /// units of work.
    Backfill { days: u32, pause: Duration },
}

/// Everything a run needs besides its collaborators. Lives for one process run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub locations: Vec<Location>,
    pub mode: RunMode,
}

/// One independently-failable task.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOfWork<'a> {
    pub location: &'a Location,
    pub window: FetchWindow,
    pub target_date: NaiveDate,
}

/// How a single unit of work ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Stored(LocationId),
    /// A source returned nothing usable.
    Skipped,
    /// The store rejected the write.
    Failed,
}

/// Counts of unit outcomes for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub units: usize,
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: UnitOutcome) {
        self.units += 1;
        match outcome {
            UnitOutcome::Stored(_) => self.stored += 1,
            UnitOutcome::Skipped => self.skipped += 1,
            UnitOutcome::Failed => self.failed += 1,
        }
    }
}

/// Dates `[today - days, today - 1]`, oldest first.
pub fn backfill_dates(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (1..=days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back.into())))
        .collect()
}

pub struct RunDriver<A, W, S> {
    air_quality: A,
    weather: W,
    store: S,
    config: RunConfig,
}

impl<A, W, S> RunDriver<A, W, S>
where
    A: AirQualityApi,
    W: WeatherApi,
    S: ReadingStore,
{
    pub fn new(air_quality: A, weather: W, store: S, config: RunConfig) -> Self {
        Self {
            air_quality,
            weather,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Enumerates the run's units of work. Backfill is date-major: every
    /// location for the oldest date, then the next date.
    pub fn units(&self, today: NaiveDate) -> Vec<UnitOfWork<'_>> {
        let locations = &self.config.locations;
        match self.config.mode {
            RunMode::Current => locations
                .iter()
                .map(|location| UnitOfWork {
                    location,
                    window: FetchWindow::Current,
                    target_date: today,
                })
                .collect(),
            RunMode::Backfill { days, .. } => backfill_dates(today, days)
                .into_iter()
                .flat_map(|date| {
                    locations.iter().map(move |location| UnitOfWork {
                        location,
                        window: FetchWindow::Day(date),
                        target_date: date,
                    })
                })
                .collect(),
        }
    }

    /// Processes every unit of work in order and returns the tally.
    pub async fn run(&self, today: NaiveDate) -> RunSummary {
        let units = self.units(today);
        let pause = match self.config.mode {
            RunMode::Backfill { pause, .. } => pause,
            RunMode::Current => Duration::ZERO,
        };

        info!(mode = ?self.config.mode, units = units.len(), "Starting run");
        let mut summary = RunSummary::default();

        for (i, unit) in units.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            let span = tracing::info_span!(
                "unit",
                city = %unit.location.city,
                date = %unit.target_date,
            );
            let outcome = self.process(unit).instrument(span).await;
            summary.record(outcome);
        }

        info!(
            units = summary.units,
            stored = summary.stored,
            skipped = summary.skipped,
            failed = summary.failed,
            "Run finished"
        );
        summary
    }

    async fn process(&self, unit: &UnitOfWork<'_>) -> UnitOutcome {
        let location = unit.location;

        let air_quality = match self
            .air_quality
            .lookup(location.latitude, location.longitude, unit.window)
            .await
        {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Air quality fetch failed");
                None
            }
        };

        let weather = match self
            .weather
            .daily(location.latitude, location.longitude, unit.window)
            .await
        {
            Ok(resp) => Some(resp),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Weather fetch failed");
                None
            }
        };

        let Some(reading) = merge(unit.target_date, air_quality.as_ref(), weather.as_ref()) else {
            warn!("No usable data, skipping");
            return UnitOutcome::Skipped;
        };
        debug!(?reading, "Merged reading");

        match self.store.upsert(location, &reading).await {
            Ok(location_id) => {
                info!(location_id, "Reading stored");
                UnitOutcome::Stored(location_id)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Failed to store reading");
                UnitOutcome::Failed
            }
        }
    }
}
