//! Core records: locations of interest and the flat daily reading.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Database identifier of a row in `locations`.
pub type LocationId = i32;

/// A named point of interest. Identity is `(city, country)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(city: &str, country: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            city: city.to_string(),
            country: country.to_string(),
            latitude,
            longitude,
        }
    }
}

/// Locations tracked when no override file is configured.
pub fn default_locations() -> Vec<Location> {
    vec![
        Location::new("Savannah", "USA", 32.0809, -81.0912),
        Location::new("Port Wentworth", "USA", 32.17, -81.17),
        Location::new("Pooler", "USA", 32.11, -81.25),
    ]
}

/// Pollutants tracked per reading, by the code the air-quality API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm10,
    Pm25,
    O3,
    No2,
    Co,
    So2,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm10,
        Pollutant::Pm25,
        Pollutant::O3,
        Pollutant::No2,
        Pollutant::Co,
        Pollutant::So2,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm25 => "pm25",
            Pollutant::O3 => "o3",
            Pollutant::No2 => "no2",
            Pollutant::Co => "co",
            Pollutant::So2 => "so2",
        }
    }
}

/// One day of merged air-quality and weather values for a single location.
///
/// Every measurement is optional: sources omit pollutants they do not measure
/// and may report `null` weather aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyReading {
    pub reading_date: NaiveDate,
    pub aqi: Option<f64>,
    pub pm10: Option<f64>,
    pub pm25: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub co: Option<f64>,
    pub so2: Option<f64>,
    pub temperature_celsius: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
}

impl DailyReading {
    pub fn empty(reading_date: NaiveDate) -> Self {
        Self {
            reading_date,
            ..Default::default()
        }
    }

    /// Mutable slot for `pollutant`.
    pub fn pollutant_mut(&mut self, pollutant: Pollutant) -> &mut Option<f64> {
        match pollutant {
            Pollutant::Pm10 => &mut self.pm10,
            Pollutant::Pm25 => &mut self.pm25,
            Pollutant::O3 => &mut self.o3,
            Pollutant::No2 => &mut self.no2,
            Pollutant::Co => &mut self.co,
            Pollutant::So2 => &mut self.so2,
        }
    }

    pub fn pollutant(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm10 => self.pm10,
            Pollutant::Pm25 => self.pm25,
            Pollutant::O3 => self.o3,
            Pollutant::No2 => self.no2,
            Pollutant::Co => self.co,
            Pollutant::So2 => self.so2,
        }
    }
}
