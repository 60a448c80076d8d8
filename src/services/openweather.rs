// SPDX-License-Identifier: MIT

//! OpenWeather API client.
//!
//! Handles:
//! - Current conditions by city name or coordinates
//! - 5-day/3-hour forecasts
//! - Status-code mapping for upstream failures (401/404/429/other)

use crate::error::AppError;
use crate::models::Units;
use serde::Deserialize;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// OpenWeather API client.
#[derive(Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a new client with an API key.
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            api_key,
        }
    }

    /// Fetch current conditions for a city name.
    pub async fn current_by_city(
        &self,
        city: &str,
        units: Units,
    ) -> Result<CurrentWeather, AppError> {
        self.get_json("weather", &[("q", city), ("units", units.as_query())])
            .await
    }

    /// Fetch current conditions for a latitude/longitude pair.
    pub async fn current_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<CurrentWeather, AppError> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        self.get_json(
            "weather",
            &[("lat", &lat), ("lon", &lon), ("units", units.as_query())],
        )
        .await
    }

    /// Fetch the 5-day forecast (3-hour granularity, up to 40 entries).
    pub async fn forecast_by_city(
        &self,
        city: &str,
        units: Units,
    ) -> Result<ForecastPayload, AppError> {
        self.get_json("forecast", &[("q", city), ("units", units.as_query())])
            .await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("OpenWeather request failed: {}", e))?;

        self.check_response_json(response).await
    }

    /// Map upstream status codes to application errors, or parse the body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("HTTP {}", status));

            return Err(match status.as_u16() {
                401 => AppError::UpstreamAuth,
                404 => AppError::UpstreamNotFound,
                429 => {
                    tracing::warn!("OpenWeather rate limit hit (429)");
                    AppError::UpstreamRateLimited
                }
                code => AppError::Upstream {
                    status: code,
                    message,
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("OpenWeather JSON parse error: {}", e).into())
    }
}

/// Error body shape used by OpenWeather (`{"cod": "...", "message": "..."}`).
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

// ─── Upstream payloads ───────────────────────────────────────
//
// Every field is defaulted: a payload that deserializes at all yields a
// record, with missing numerics as 0 and missing strings empty.

/// Current-weather response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: UpstreamSys,
    #[serde(default)]
    pub main: UpstreamMain,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
    #[serde(default)]
    pub wind: UpstreamWind,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamSys {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamMain {
    #[serde(default)]
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: i64,
    #[serde(default)]
    pub pressure: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamCondition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamWind {
    #[serde(default)]
    pub speed: f64,
}

/// 5-day/3-hour forecast response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub city: ForecastCity,
    #[serde(default)]
    pub list: Vec<ForecastSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// One 3-hour forecast slot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastSlot {
    /// Forecast time (unix seconds)
    #[serde(default)]
    pub dt: i64,
    #[serde(default)]
    pub main: UpstreamMain,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_weather_tolerates_sparse_payload() {
        let payload: CurrentWeather = serde_json::from_str(r#"{"name": "Pune"}"#).unwrap();

        assert_eq!(payload.name, "Pune");
        assert_eq!(payload.sys.country, None);
        assert_eq!(payload.main.temp, 0.0);
        assert!(payload.weather.is_empty());
        assert_eq!(payload.wind.speed, 0.0);
    }

    #[test]
    fn test_forecast_payload_parses_slots() {
        let payload: ForecastPayload = serde_json::from_str(
            r#"{
                "city": { "name": "Mumbai", "country": "IN" },
                "list": [
                    { "dt": 1000, "main": { "temp": 27.4 }, "weather": [{ "description": "haze", "icon": "50d" }] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(payload.city.name, "Mumbai");
        assert_eq!(payload.list.len(), 1);
        assert_eq!(payload.list[0].dt, 1000);
        assert_eq!(payload.list[0].main.temp, 27.4);
    }

    #[test]
    fn test_error_body_parse() {
        let body: UpstreamErrorBody =
            serde_json::from_str(r#"{"cod": "404", "message": "city not found"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("city not found"));
    }
}
