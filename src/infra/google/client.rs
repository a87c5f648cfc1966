use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, SecondsFormat};
use reqwest::Request;
use serde::Serialize;
use tracing::debug;

use crate::fetch::{HttpClient, fetch_json, post_json_request};
use crate::services::FetchWindow;
use crate::services::air_quality::{
    AirQualityApi, AirQualityPayload, Conditions, HistoryResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://airquality.googleapis.com/v1";

/// Extra computations requested on every lookup. The set was arrived at by
/// trial and error; it returns the full pollutant list for our locations.
pub const EXTRA_COMPUTATIONS: &[&str] = &[
    "HEALTH_RECOMMENDATIONS",
    "POLLUTANT_ADDITIONAL_INFO",
    "DOMINANT_POLLUTANT_CONCENTRATION",
    "POLLUTANT_CONCENTRATION",
    "LOCAL_AQI",
];

/// Hourly records per history page; one page covers one day.
const HOURS_PER_DAY: u32 = 24;

#[derive(Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Period {
    start_time: String,
    end_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    location: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<Period>,
    extra_computations: &'static [&'static str],
}

impl Period {
    /// The whole UTC day, `00:00:00Z` through `23:59:59.999999Z`.
    fn utc_day(date: NaiveDate) -> Self {
        let end = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
        Self {
            start_time: date
                .and_time(NaiveTime::MIN)
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            end_time: date
                .and_time(end)
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

/// Client for the Google Air Quality API.
///
/// The API key is not handled here: wrap the transport in
/// [`UrlParam`](crate::fetch::auth::UrlParam) so every request carries it.
pub struct GoogleAirQualityClient<C> {
    http: C,
    base_url: String,
}

impl<C: HttpClient> GoogleAirQualityClient<C> {
    pub fn new(http: C) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Builds the lookup request for `window` without sending it.
    pub fn build_request(&self, latitude: f64, longitude: f64, window: FetchWindow) -> Result<Request> {
        let location = LatLng {
            latitude,
            longitude,
        };
        match window {
            FetchWindow::Current => post_json_request(
                &format!("{}/currentConditions:lookup", self.base_url),
                &LookupRequest {
                    page_size: None,
                    location,
                    period: None,
                    extra_computations: EXTRA_COMPUTATIONS,
                },
            ),
            FetchWindow::Day(date) => post_json_request(
                &format!("{}/history:lookup", self.base_url),
                &LookupRequest {
                    page_size: Some(HOURS_PER_DAY),
                    location,
                    period: Some(Period::utc_day(date)),
                    extra_computations: EXTRA_COMPUTATIONS,
                },
            ),
        }
    }
}

#[async_trait]
impl<C: HttpClient> AirQualityApi for GoogleAirQualityClient<C> {
    #[tracing::instrument(skip(self))]
    async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
        window: FetchWindow,
    ) -> Result<AirQualityPayload> {
        let req = self.build_request(latitude, longitude, window)?;
        let payload = match window {
            FetchWindow::Current => {
                AirQualityPayload::Current(fetch_json::<_, Conditions>(&self.http, req).await?)
            }
            FetchWindow::Day(_) => {
                let history: HistoryResponse = fetch_json(&self.http, req).await?;
                debug!(hours = history.hours_info.len(), "History lookup returned");
                AirQualityPayload::Hourly(history.hours_info)
            }
        };
        Ok(payload)
    }
}
