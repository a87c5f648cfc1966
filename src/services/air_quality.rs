//! Air-quality source contract and response shapes.

use anyhow::Result;
use serde::{Deserialize, Deserializer};

use super::FetchWindow;

/// Index code selecting the universal AQI out of the returned index schemes.
pub const UNIVERSAL_AQI_CODE: &str = "uaqi";

/// One index scheme's value, e.g. `{"code": "uaqi", "aqi": 42}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AqiIndex {
    pub code: Option<String>,
    pub aqi: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Concentration {
    pub value: Option<f64>,
    pub units: Option<String>,
}

/// One pollutant's measurement, e.g. `{"code": "pm25", "concentration": {"value": 8.1}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollutantEntry {
    pub code: Option<String>,
    pub concentration: Option<Concentration>,
}

/// Conditions at a single instant: the body of a current-conditions lookup,
/// or one element of a history lookup's `hoursInfo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conditions {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub indexes: Vec<AqiIndex>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pollutants: Vec<PollutantEntry>,
}

/// An explicit `null` list means "not reported", same as an absent one.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Conditions {
    /// AQI of the universal index, if reported.
    pub fn universal_aqi(&self) -> Option<f64> {
        self.indexes
            .iter()
            .find(|idx| idx.code.as_deref() == Some(UNIVERSAL_AQI_CODE))
            .and_then(|idx| idx.aqi)
    }

    /// Concentration of the pollutant with `code`, if reported.
    pub fn concentration(&self, code: &str) -> Option<f64> {
        self.pollutants
            .iter()
            .find(|p| p.code.as_deref() == Some(code))
            .and_then(|p| p.concentration.as_ref())
            .and_then(|c| c.value)
    }
}

/// Body of a history lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    #[serde(default)]
    pub hours_info: Vec<Conditions>,
}

/// What an air-quality lookup produced, by window.
#[derive(Debug, Clone)]
pub enum AirQualityPayload {
    /// A single snapshot from [`FetchWindow::Current`].
    Current(Conditions),
    /// Zero or more hourly snapshots from [`FetchWindow::Day`].
    Hourly(Vec<Conditions>),
}

/// A provider of air-quality observations.
#[async_trait::async_trait]
pub trait AirQualityApi: Send + Sync {
    /// Looks up pollutant and index data at a point for `window`.
    async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
        window: FetchWindow,
    ) -> Result<AirQualityPayload>;
}
