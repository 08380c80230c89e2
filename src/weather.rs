/*
 *  weather.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
use serde_json::Value;
use reqwest::{Client, header};
use log::{info, error, debug};
use chrono::{Local, TimeZone};
use thiserror::Error;

use flate2::read::GzDecoder;
use std::io::Read;

use crate::conditions::wind_direction;
use crate::config::StationConfig;

/// Number of forecast days kept from the daily list
pub const FORECAST_DAYS: usize = 5;

/// Errors raised while talking to the Tempest REST API.
#[derive(Debug, Error)]
pub enum WeatherApiError {
    #[error("HTTP request error: {0}")]
    HttpRequestError(#[from] reqwest::Error),
    #[error("JSON deserialization error: {0}")]
    DeserializationError(#[from] serde_json::Error),
    #[error("Tempest API error: {0}")]
    ApiError(String),
    #[error("Missing weather data: {0}")]
    MissingData(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// One day of the daily forecast
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastDay {
    /// abbreviated local weekday, e.g. "Tue"
    pub day: String,
    pub high: i32,
    pub low: i32,
    pub icon: String,
}

/// Station observation, already rounded for display
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub pressure: f64,
    pub rain_today: f64,
    pub uv: f64,
    pub strikes: u32,
}

/// Current conditions and the daily list from the forecast endpoint
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forecast {
    pub icon: String,
    pub summary: String,
    pub days: Vec<ForecastDay>,
}

/// Everything the dashboard shows for one run
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    /// deg C, 1 decimal
    pub temperature: f64,
    /// deg C, 1 decimal
    pub feels_like: f64,
    /// percent, whole
    pub humidity: f64,
    /// m/s, 1 decimal
    pub wind_speed: f64,
    pub wind_direction: String,
    /// sea level hPa, whole
    pub pressure: f64,
    /// mm since local midnight, 1 decimal
    pub rain_today: f64,
    pub uv: f64,
    pub strikes: u32,
    pub icon: String,
    pub summary: String,
    pub forecast: Vec<ForecastDay>,
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self::new(Observation::default(), Forecast::default())
    }
}

impl WeatherReading {
    pub fn new(obs: Observation, forecast: Forecast) -> Self {
        let wind_direction = if obs.wind_direction.is_empty() {
            wind_direction(0.0).to_string()
        } else {
            obs.wind_direction
        };
        Self {
            temperature: obs.temperature,
            feels_like: obs.feels_like,
            humidity: obs.humidity,
            wind_speed: obs.wind_speed,
            wind_direction,
            pressure: obs.pressure,
            rain_today: obs.rain_today,
            uv: obs.uv,
            strikes: obs.strikes,
            icon: if forecast.icon.is_empty() { "clear-day".to_string() } else { forecast.icon },
            summary: if forecast.summary.is_empty() { "Clear".to_string() } else { forecast.summary },
            forecast: forecast.days,
        }
    }

    pub fn has_lightning(&self) -> bool {
        self.strikes > 0
    }
}

/// Round to `places` decimals against the exact binary value, ties to even.
/// 1.15 is stored as 1.1499.. so it rounds down.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

fn number(v: &Value, key: &str) -> f64 {
    v.get(key).and_then(Value::as_f64).filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn text<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Abbreviated local weekday for an epoch timestamp; empty when unusable.
pub fn day_name(epoch: &Value) -> String {
    let secs = epoch.as_i64().or_else(|| epoch.as_f64().map(|f| f.trunc() as i64));
    secs.and_then(|s| Local.timestamp_opt(s, 0).earliest())
        .map(|dt| dt.format("%a").to_string())
        .unwrap_or_default()
}

/// Reject responses carrying a non-zero `status.status_code`.
fn check_status(json: &Value) -> Result<(), WeatherApiError> {
    if let Some(status) = json.get("status") {
        let code = status.get("status_code").and_then(Value::as_i64);
        if code != Some(0) {
            let message = status.get("status_message").and_then(Value::as_str).unwrap_or("unknown");
            return Err(WeatherApiError::ApiError(format!(
                "status_code {} ({})",
                code.map_or_else(|| "missing".to_string(), |c| c.to_string()),
                message
            )));
        }
    }
    Ok(())
}

/// Normalise the `/observations/station` response.
pub fn parse_observation(json: &Value) -> Result<Observation, WeatherApiError> {
    check_status(json)?;
    let obs = json
        .get("obs")
        .ok_or_else(|| WeatherApiError::MissingData("no 'obs' in observation response".to_string()))?
        .get(0)
        .ok_or_else(|| WeatherApiError::MissingData("'obs' is empty".to_string()))?;

    let strikes = obs.get("strike_count")
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().filter(|f| *f > 0.0).map(|f| f as u64)))
        .unwrap_or(0);

    Ok(Observation {
        temperature: round_to(number(obs, "air_temperature"), 1),
        feels_like: round_to(number(obs, "feels_like"), 1),
        humidity: round_to(number(obs, "relative_humidity"), 0),
        wind_speed: round_to(number(obs, "wind_avg"), 1),
        wind_direction: wind_direction(number(obs, "wind_direction")).to_string(),
        pressure: round_to(number(obs, "sea_level_pressure"), 0),
        rain_today: round_to(number(obs, "precip_accum_local_day"), 1),
        uv: round_to(number(obs, "uv"), 1),
        strikes: u32::try_from(strikes).unwrap_or(u32::MAX),
    })
}

/// Normalise the `/better_forecast` response, keeping the first five days.
pub fn parse_forecast(json: &Value) -> Result<Forecast, WeatherApiError> {
    check_status(json)?;
    let current = json
        .get("current_conditions")
        .ok_or_else(|| WeatherApiError::MissingData("no 'current_conditions' in forecast".to_string()))?;
    let daily = json
        .get("forecast")
        .and_then(|f| f.get("daily"))
        .and_then(Value::as_array)
        .ok_or_else(|| WeatherApiError::MissingData("no 'forecast.daily' in forecast".to_string()))?;

    let days = daily
        .iter()
        .take(FORECAST_DAYS)
        .map(|day| ForecastDay {
            day: day.get("day_start_local").map(day_name).unwrap_or_default(),
            high: round_to(number(day, "air_temp_high"), 0) as i32,
            low: round_to(number(day, "air_temp_low"), 0) as i32,
            icon: text(day, "icon").unwrap_or("cloudy").to_string(),
        })
        .collect();

    Ok(Forecast {
        icon: text(current, "icon").unwrap_or("clear-day").to_string(),
        summary: text(current, "conditions")
            .or_else(|| text(current, "summary"))
            .unwrap_or("Clear")
            .to_string(),
        days,
    })
}

/// Tempest REST client for a single station
#[derive(Debug)]
pub struct WeatherFlow {
    client: Client,
    api_base: String,
    station_id: String,
    token: String,
}

impl WeatherFlow {
    pub fn new(station: &StationConfig) -> Result<Self, WeatherApiError> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let station_id = station.station_id.clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| WeatherApiError::InvalidInput("station id required".to_string()))?;
        let token = station.token.clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| WeatherApiError::InvalidInput("API token required".to_string()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Accept-Encoding", header::HeaderValue::from_static("gzip"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(station.timeout())
            .build()?;

        Ok(Self {
            client,
            api_base: station.api_base().to_string(),
            station_id,
            token,
        })
    }

    pub fn observations_url(&self) -> String {
        format!("{}/observations/station/{}", self.api_base, self.station_id)
    }

    pub fn forecast_url(&self) -> String {
        format!("{}/better_forecast", self.api_base)
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, WeatherApiError> {
        let response = self.client.get(url).query(params).send().await?;
        debug!("{} -> {}", url, response.status());
        let raw = response.bytes().await?;

        // gzip when the server honoured Accept-Encoding, plain otherwise
        let plain = {
            let mut decoder = GzDecoder::new(&raw[..]);
            let mut decoded = String::new();
            match decoder.read_to_string(&mut decoded) {
                Ok(_) => decoded,
                Err(_) => String::from_utf8_lossy(&raw).to_string(),
            }
        };
        Ok(serde_json::from_str(&plain)?)
    }

    /// Both requests, in order; the first failure aborts the fetch.
    pub async fn fetch_reading(&self) -> Result<WeatherReading, WeatherApiError> {
        info!("Fetching observations for station {}...", self.station_id);
        let obs_json = self
            .get_json(&self.observations_url(), &[("token", self.token.as_str())])
            .await?;
        let obs = parse_observation(&obs_json)?;

        info!("Fetching forecast for station {}...", self.station_id);
        let forecast_json = self
            .get_json(
                &self.forecast_url(),
                &[("station_id", self.station_id.as_str()), ("token", self.token.as_str())],
            )
            .await?;
        let forecast = parse_forecast(&forecast_json)?;

        Ok(WeatherReading::new(obs, forecast))
    }

    /// Fetch, logging and swallowing any failure as "no data".
    pub async fn fetch(&self) -> Option<WeatherReading> {
        match self.fetch_reading().await {
            Ok(reading) => {
                info!(
                    "Weather data fetched: {:.1}°, {}, {} forecast days, {} strikes",
                    reading.temperature, reading.summary, reading.forecast.len(), reading.strikes
                );
                Some(reading)
            }
            Err(e) => {
                error!("Error fetching weather: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_obs() -> Value {
        json!({
            "status": { "status_code": 0, "status_message": "SUCCESS" },
            "station_id": 12345,
            "obs": [{
                "air_temperature": 22.34,
                "feels_like": 21.96,
                "relative_humidity": 55,
                "wind_avg": 12.04,
                "wind_direction": 48,
                "sea_level_pressure": 1012.4,
                "precip_accum_local_day": 0.0,
                "uv": 6.23,
                "strike_count": 0
            }]
        })
    }

    fn sample_forecast(days: usize) -> Value {
        let daily: Vec<Value> = (0..days)
            .map(|i| json!({
                "day_start_local": 1_700_000_000i64 + i as i64 * 86_400,
                "air_temp_high": 20.6 + i as f64,
                "air_temp_low": 11.4,
                "icon": "partly-cloudy-day"
            }))
            .collect();
        json!({
            "current_conditions": { "icon": "clear-day", "conditions": "Clear" },
            "forecast": { "daily": daily }
        })
    }

    #[test]
    fn test_observation_rounding() {
        let obs = parse_observation(&sample_obs()).unwrap();
        assert_eq!(obs.temperature, 22.3);
        assert_eq!(obs.feels_like, 22.0);
        assert_eq!(obs.humidity, 55.0);
        assert_eq!(obs.wind_speed, 12.0);
        assert_eq!(obs.wind_direction, "NE");
        assert_eq!(obs.pressure, 1012.0);
        assert_eq!(obs.rain_today, 0.0);
        assert_eq!(obs.uv, 6.2);
        assert_eq!(obs.strikes, 0);
    }

    #[test]
    fn test_missing_obs_key_is_an_error() {
        let json = json!({ "status": { "status_code": 0 }, "station_id": 1 });
        assert!(matches!(parse_observation(&json), Err(WeatherApiError::MissingData(_))));
        let json = json!({ "status": { "status_code": 0 }, "obs": [] });
        assert!(matches!(parse_observation(&json), Err(WeatherApiError::MissingData(_))));
    }

    #[test]
    fn test_api_status_rejected() {
        let json = json!({ "status": { "status_code": 401, "status_message": "UNAUTHORIZED" }, "obs": [{}] });
        match parse_observation(&json) {
            Err(WeatherApiError::ApiError(msg)) => assert!(msg.contains("401") && msg.contains("UNAUTHORIZED")),
            other => panic!("unexpected {other:?}"),
        }
        // present but without a code counts as a failure too
        let json = json!({ "status": {}, "obs": [{}] });
        assert!(matches!(parse_observation(&json), Err(WeatherApiError::ApiError(_))));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let obs = parse_observation(&json!({ "obs": [{ "air_temperature": "warm" }] })).unwrap();
        assert_eq!(obs, Observation { wind_direction: "N".to_string(), ..Default::default() });
    }

    #[test]
    fn test_forecast_truncated_to_five_days() {
        let forecast = parse_forecast(&sample_forecast(10)).unwrap();
        assert_eq!(forecast.days.len(), FORECAST_DAYS);
        assert_eq!(forecast.days[0].high, 21);
        assert_eq!(forecast.days[0].low, 11);
        assert_eq!(forecast.days[4].high, 25);
        assert_eq!(forecast.summary, "Clear");
        assert_eq!(forecast.icon, "clear-day");
        let expected = Local.timestamp_opt(1_700_000_000, 0).unwrap().format("%a").to_string();
        assert_eq!(forecast.days[0].day, expected);

        let short = parse_forecast(&sample_forecast(3)).unwrap();
        assert_eq!(short.days.len(), 3);
    }

    #[test]
    fn test_forecast_missing_sections() {
        assert!(matches!(
            parse_forecast(&json!({ "forecast": { "daily": [] } })),
            Err(WeatherApiError::MissingData(_))
        ));
        assert!(matches!(
            parse_forecast(&json!({ "current_conditions": {} })),
            Err(WeatherApiError::MissingData(_))
        ));
    }

    #[test]
    fn test_forecast_entry_defaults() {
        let json = json!({
            "current_conditions": {},
            "forecast": { "daily": [ {} ] }
        });
        let forecast = parse_forecast(&json).unwrap();
        assert_eq!(forecast.icon, "clear-day");
        assert_eq!(forecast.summary, "Clear");
        assert_eq!(forecast.days[0], ForecastDay { day: String::new(), high: 0, low: 0, icon: "cloudy".to_string() });
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(1.5, 0), 2.0);
        assert_eq!(round_to(1012.5, 0), 1012.0);
        assert_eq!(round_to(-3.26, 1), -3.3);
        assert_eq!(round_to(1.15, 1), 1.1);
        assert_eq!(round_to(0.35, 1), 0.3);
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(2.675, 2), 2.67);
    }

    #[test]
    fn test_reading_defaults_are_neutral() {
        let reading = WeatherReading::default();
        assert_eq!(reading.icon, "clear-day");
        assert_eq!(reading.wind_direction, "N");
        assert!(!reading.has_lightning());
        assert!(reading.forecast.is_empty());
    }

    #[test]
    fn test_client_requires_credentials() {
        let station = StationConfig { station_id: Some("1".into()), ..Default::default() };
        assert!(matches!(WeatherFlow::new(&station), Err(WeatherApiError::InvalidInput(_))));
        let station = StationConfig {
            station_id: Some("77".into()),
            token: Some("t".into()),
            api_base: Some("http://localhost:9/swd/rest/".into()),
            ..Default::default()
        };
        let client = WeatherFlow::new(&station).unwrap();
        assert_eq!(client.observations_url(), "http://localhost:9/swd/rest/observations/station/77");
        assert_eq!(client.forecast_url(), "http://localhost:9/swd/rest/better_forecast");
    }

    #[tokio::test]
    async fn test_unreachable_api_yields_no_data() {
        let station = StationConfig {
            station_id: Some("77".into()),
            token: Some("t".into()),
            // nothing listens on the discard port
            api_base: Some("http://127.0.0.1:9".into()),
            timeout_secs: Some(2),
        };
        let client = WeatherFlow::new(&station).unwrap();
        assert!(client.fetch().await.is_none());
    }
}
