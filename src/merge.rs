//! Combines one air-quality payload and one weather response into a
//! [`DailyReading`].
//!
//! The merge is all-or-nothing: any missing input or unusable shape drops the
//! unit of work instead of producing a partial record.

use chrono::NaiveDate;

use crate::model::{DailyReading, Pollutant};
use crate::services::air_quality::{AirQualityPayload, Conditions};
use crate::services::weather::DailyWeatherResponse;

/// Merges the two source payloads for `target_date`.
///
/// Returns `None` when either input is absent, when the weather series are
/// empty, or when a history lookup returned no hourly records. The reading
/// date is always `target_date`, never inferred from the payloads.
pub fn merge(
    target_date: NaiveDate,
    air_quality: Option<&AirQualityPayload>,
    weather: Option<&DailyWeatherResponse>,
) -> Option<DailyReading> {
    let weather = weather?.first_day()?;

    let mut reading = match air_quality? {
        AirQualityPayload::Current(conditions) => direct(target_date, conditions),
        AirQualityPayload::Hourly(hours) => hourly_average(target_date, hours)?,
    };

    reading.temperature_celsius = weather.temperature_celsius;
    reading.precipitation_mm = weather.precipitation_mm;
    reading.wind_speed_kmh = weather.wind_speed_kmh;
    Some(reading)
}

/// Takes index and pollutant values straight from a single snapshot.
fn direct(target_date: NaiveDate, conditions: &Conditions) -> DailyReading {
    let mut reading = DailyReading::empty(target_date);
    reading.aqi = conditions.universal_aqi();
    for pollutant in Pollutant::ALL {
        *reading.pollutant_mut(pollutant) = conditions.concentration(pollutant.code());
    }
    reading
}

/// Averages each field over the hours that report it.
fn hourly_average(target_date: NaiveDate, hours: &[Conditions]) -> Option<DailyReading> {
    if hours.is_empty() {
        return None;
    }

    let mut reading = DailyReading::empty(target_date);
    reading.aqi = mean_of_present(hours.iter().map(Conditions::universal_aqi));
    for pollutant in Pollutant::ALL {
        *reading.pollutant_mut(pollutant) =
            mean_of_present(hours.iter().map(|h| h.concentration(pollutant.code())));
    }
    Some(reading)
}

/// Arithmetic mean of the `Some` values; `None` if there are none.
pub fn mean_of_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
