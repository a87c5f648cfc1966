//! Weather source contract and response shapes.

use anyhow::Result;
use serde::Deserialize;

use super::FetchWindow;

/// Daily variables requested from the weather source, in request order.
pub const DAILY_VARIABLES: &str = "temperature_2m_mean,precipitation_sum,wind_speed_10m_max";

/// Column-oriented daily series; one element per requested day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m_max: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyWeatherResponse {
    pub daily: DailySeries,
}

/// The single-day aggregate the merger consumes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DailyWeather {
    pub temperature_celsius: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
}

impl DailyWeatherResponse {
    /// First day of the series, or `None` when any series is empty.
    pub fn first_day(&self) -> Option<DailyWeather> {
        let d = &self.daily;
        Some(DailyWeather {
            temperature_celsius: *d.temperature_2m_mean.first()?,
            precipitation_mm: *d.precipitation_sum.first()?,
            wind_speed_kmh: *d.wind_speed_10m_max.first()?,
        })
    }
}

/// A provider of daily aggregate weather.
#[async_trait::async_trait]
pub trait WeatherApi: Send + Sync {
    /// Fetches exactly one day of aggregates at a point for `window`.
    async fn daily(
        &self,
        latitude: f64,
        longitude: f64,
        window: FetchWindow,
    ) -> Result<DailyWeatherResponse>;
}
