use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, info};

use super::ReadingStore;
use crate::config::DatabaseConfig;
use crate::model::{DailyReading, Location, LocationId};

const SELECT_LOCATION: &str = "SELECT id FROM locations WHERE city = $1 AND country = $2";

const INSERT_LOCATION: &str = r#"
INSERT INTO locations (city, country, latitude, longitude)
VALUES ($1, $2, $3, $4)
RETURNING id
"#;

const UPSERT_READING: &str = r#"
INSERT INTO daily_readings (
    location_id, reading_date, aqi, pm10, pm25, o3, no2, co, so2,
    temperature_celsius, precipitation_mm, wind_speed_kmh
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
ON CONFLICT (location_id, reading_date) DO UPDATE SET
    aqi                 = EXCLUDED.aqi,
    pm10                = EXCLUDED.pm10,
    pm25                = EXCLUDED.pm25,
    o3                  = EXCLUDED.o3,
    no2                 = EXCLUDED.no2,
    co                  = EXCLUDED.co,
    so2                 = EXCLUDED.so2,
    temperature_celsius = EXCLUDED.temperature_celsius,
    precipitation_mm    = EXCLUDED.precipitation_mm,
    wind_speed_kmh      = EXCLUDED.wind_speed_kmh
"#;

/// PostgreSQL-backed store over a single-connection pool; runs are sequential.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Opens the pool and establishes the first connection, so an unreachable
    /// database fails here rather than on the first upsert.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "failed to connect to postgres at {}:{}/{}",
                    config.host, config.port, config.name
                )
            })?;

        info!(host = %config.host, port = config.port, database = %config.name, "Database connection established");
        Ok(Self { pool })
    }

    /// Wraps an already-open pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgStore {
    async fn upsert(&self, location: &Location, reading: &DailyReading) -> Result<LocationId> {
        let mut tx = self.pool.begin().await.context("failed to open transaction")?;

        let existing: Option<LocationId> = sqlx::query_scalar(SELECT_LOCATION)
            .bind(&location.city)
            .bind(&location.country)
            .fetch_optional(&mut *tx)
            .await
            .context("location lookup failed")?;

        let location_id = match existing {
            Some(id) => id,
            None => {
                let id: LocationId = sqlx::query_scalar(INSERT_LOCATION)
                    .bind(&location.city)
                    .bind(&location.country)
                    .bind(location.latitude)
                    .bind(location.longitude)
                    .fetch_one(&mut *tx)
                    .await
                    .context("location insert failed")?;
                debug!(city = %location.city, location_id = id, "Created location");
                id
            }
        };

        sqlx::query(UPSERT_READING)
            .bind(location_id)
            .bind(reading.reading_date)
            .bind(reading.aqi)
            .bind(reading.pm10)
            .bind(reading.pm25)
            .bind(reading.o3)
            .bind(reading.no2)
            .bind(reading.co)
            .bind(reading.so2)
            .bind(reading.temperature_celsius)
            .bind(reading.precipitation_mm)
            .bind(reading.wind_speed_kmh)
            .execute(&mut *tx)
            .await
            .context("reading upsert failed")?;

        tx.commit().await.context("commit failed")?;
        Ok(location_id)
    }
}
