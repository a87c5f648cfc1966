use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Request, Url};

use crate::fetch::{HttpClient, fetch_json, get_request};
use crate::services::FetchWindow;
use crate::services::weather::{DAILY_VARIABLES, DailyWeatherResponse, WeatherApi};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Client for the Open-Meteo forecast and archive APIs. No key required.
pub struct OpenMeteoClient<C> {
    http: C,
    forecast_url: String,
    archive_url: String,
}

impl<C: HttpClient> OpenMeteoClient<C> {
    pub fn new(http: C) -> Self {
        Self {
            http,
            forecast_url: FORECAST_URL.to_string(),
            archive_url: ARCHIVE_URL.to_string(),
        }
    }

    /// Today's forecast for [`FetchWindow::Current`], the archive otherwise.
    pub fn build_request(&self, latitude: f64, longitude: f64, window: FetchWindow) -> Result<Request> {
        let mut params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("daily", DAILY_VARIABLES.to_string()),
            ("timezone", "auto".to_string()),
        ];
        let base = match window {
            FetchWindow::Current => {
                params.push(("forecast_days", "1".to_string()));
                &self.forecast_url
            }
            FetchWindow::Day(date) => {
                let day = date.format("%Y-%m-%d").to_string();
                params.push(("start_date", day.clone()));
                params.push(("end_date", day));
                &self.archive_url
            }
        };
        let url = Url::parse_with_params(base, &params)?;
        get_request(url.as_str())
    }
}

#[async_trait]
impl<C: HttpClient> WeatherApi for OpenMeteoClient<C> {
    #[tracing::instrument(skip(self))]
    async fn daily(
        &self,
        latitude: f64,
        longitude: f64,
        window: FetchWindow,
    ) -> Result<DailyWeatherResponse> {
        let req = self.build_request(latitude, longitude, window)?;
        fetch_json(&self.http, req).await
    }
}
