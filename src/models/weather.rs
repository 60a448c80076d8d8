// SPDX-License-Identifier: MIT

//! Normalized weather records for storage and display.
//!
//! A [`WeatherRecord`] is built fresh from every upstream response and is
//! immutable after construction. It either gets discarded or written once to
//! Firestore as a [`StoredWeather`] document; reads come back with the
//! document id populated, and the display formatter branches on its presence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::openweather::CurrentWeather;

/// Template for upstream weather icons.
const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Unit system requested by the client and forwarded to the upstream API.
///
/// Values arrive already converted from upstream; this only selects the
/// request parameter and the display glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Query parameter value for the upstream API.
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Temperature glyph for display strings.
    pub fn suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }
}

/// Normalized weather snapshot derived from one upstream response.
#[derive(Debug, Clone)]
pub struct WeatherRecord {
    /// City name as reported by upstream
    pub city: String,
    /// ISO country code, when upstream provides one
    pub country: Option<String>,
    /// Temperature rounded to the nearest integer
    pub temperature: i64,
    /// Feels-like temperature, rounded
    pub feels_like: i64,
    /// First weather condition's description
    pub description: String,
    /// Short upstream icon code (e.g. "01d")
    pub icon_code: String,
    /// Relative humidity percent
    pub humidity: i64,
    /// Wind speed in upstream units
    pub wind_speed: f64,
    /// Atmospheric pressure in hPa
    pub pressure: i64,
    /// When this record was created
    pub timestamp: DateTime<Utc>,
}

impl WeatherRecord {
    /// Build a record from an upstream current-weather payload.
    ///
    /// Never fails: missing numeric fields already deserialized to 0, and a
    /// missing condition list yields empty description/icon. Whether the
    /// result is worth persisting is decided by [`Self::is_valid`].
    pub fn from_current(payload: &CurrentWeather) -> Self {
        let condition = payload.weather.first();

        Self {
            city: payload.name.clone(),
            country: payload.sys.country.clone(),
            temperature: payload.main.temp.round() as i64,
            feels_like: payload.main.feels_like.round() as i64,
            description: condition.map(|c| c.description.clone()).unwrap_or_default(),
            icon_code: condition.map(|c| c.icon.clone()).unwrap_or_default(),
            humidity: payload.main.humidity,
            wind_speed: payload.wind.speed,
            pressure: payload.main.pressure,
            timestamp: Utc::now(),
        }
    }

    /// A record is valid only when city, description, and icon code are all
    /// non-empty. Invalid records must not be persisted.
    pub fn is_valid(&self) -> bool {
        !self.city.is_empty() && !self.description.is_empty() && !self.icon_code.is_empty()
    }

    /// Produce the persistence shape for this record.
    ///
    /// Empty string fields become absent keys so stored documents stay
    /// compact; numeric zeros are meaningful and are kept.
    pub fn to_storage_document(&self) -> StoredWeather {
        StoredWeather {
            id: None,
            city: non_empty(&self.city),
            country: self.country.as_deref().and_then(non_empty),
            temperature: self.temperature,
            feels_like: self.feels_like,
            description: non_empty(&self.description),
            icon_code: non_empty(&self.icon_code),
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            pressure: self.pressure,
            timestamp: self.timestamp,
        }
    }

    /// Client-facing shape for a fresh (unpersisted) lookup.
    pub fn to_display(&self, units: Units) -> WeatherDisplay {
        WeatherDisplay {
            id: None,
            city: self.city.clone(),
            country: self.country.clone(),
            temperature: self.temperature,
            feels_like: self.feels_like,
            description: capitalize_first(&self.description),
            icon: icon_url(&self.icon_code),
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            pressure: self.pressure,
            units,
            temperature_display: None,
            recorded_at: None,
        }
    }
}

/// Weather document as persisted in Firestore.
///
/// `id` is never written; on reads it carries the generated document id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredWeather {
    /// Firestore document id (populated on reads)
    #[serde(alias = "_firestore_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub temperature: i64,
    pub feels_like: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_code: Option<String>,
    pub humidity: i64,
    pub wind_speed: f64,
    pub pressure: i64,
    /// Stored as a native Firestore timestamp so descending sort is
    /// chronological.
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl StoredWeather {
    /// Client-facing shape for a persisted entry.
    ///
    /// When the document id is present the display also carries it, along
    /// with a unit-suffixed temperature string and a short formatted
    /// timestamp.
    pub fn to_display(&self, units: Units) -> WeatherDisplay {
        let temperature = self.temperature;
        let saved = self.id.is_some();

        WeatherDisplay {
            id: self.id.clone(),
            city: self.city.clone().unwrap_or_default(),
            country: self.country.clone(),
            temperature,
            feels_like: self.feels_like,
            description: capitalize_first(self.description.as_deref().unwrap_or_default()),
            icon: icon_url(self.icon_code.as_deref().unwrap_or_default()),
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            pressure: self.pressure,
            units,
            temperature_display: saved.then(|| format!("{}{}", temperature, units.suffix())),
            recorded_at: saved.then(|| self.timestamp.format("%b %-d, %-I:%M %p").to_string()),
        }
    }
}

/// Client-facing weather representation.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherDisplay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub temperature: i64,
    pub feels_like: i64,
    /// Description with the first letter capitalized
    pub description: String,
    /// Full icon image URL
    pub icon: String,
    pub humidity: i64,
    pub wind_speed: f64,
    pub pressure: i64,
    /// Unit system label echoed without conversion
    pub units: Units,
    /// Unit-suffixed temperature string, only for persisted entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_display: Option<String>,
    /// Short formatted timestamp, only for persisted entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
}

/// Build the full icon URL from a short upstream code.
pub fn icon_url(code: &str) -> String {
    format!("{}/{}@2x.png", ICON_URL_BASE, code)
}

/// Uppercase the first letter of a description.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
