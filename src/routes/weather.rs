// SPDX-License-Identifier: MIT

//! Weather API routes: lookups, forecast, history, and favorites.
//!
//! Every handler follows the same shape: validate input, call the upstream
//! API, transform into a record, perform at most one storage operation, and
//! respond with a `success: true` envelope. Failures convert through
//! [`crate::error::AppError`] into the uniform error envelope.

use crate::error::{AppError, Result};
use crate::models::{Units, WeatherDisplay, WeatherRecord};
use crate::models::weather::{capitalize_first, icon_url};
use crate::routes::extract::{ApiJson, ApiQuery};
use crate::services::openweather::ForecastSlot;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// History responses are capped at the newest entries.
const HISTORY_LIMIT: u32 = 10;

/// Upstream forecasts arrive in 3-hour slots; every 8th slot approximates
/// the same time on consecutive days.
const FORECAST_STRIDE: usize = 8;
const FORECAST_DAYS: usize = 5;

/// Firestore document ids are limited to 1500 bytes.
const MAX_DOCUMENT_ID_BYTES: usize = 1500;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/weather/history", get(list_history).delete(clear_history))
        .route("/weather/favorites", get(list_favorites).post(add_favorite))
        .route("/weather/favorites/{id}", delete(remove_favorite))
        .route("/weather/current", get(lookup_by_coordinates))
        .route("/weather/forecast/{city}", get(get_forecast))
        .route("/weather/{city}", get(lookup_by_city))
}

#[derive(Deserialize)]
struct UnitsQuery {
    #[serde(default)]
    units: Units,
}

// ─── Current Weather ─────────────────────────────────────────

/// Current weather response for a single lookup.
#[derive(Serialize)]
pub struct WeatherResponse {
    pub success: bool,
    pub weather: WeatherDisplay,
}

/// Look up current weather by city name and record the search.
async fn lookup_by_city(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
    ApiQuery(params): ApiQuery<UnitsQuery>,
) -> Result<Json<WeatherResponse>> {
    tracing::debug!(city = %city, units = ?params.units, "City lookup");

    let payload = state.weather.current_by_city(&city, params.units).await?;
    let record = WeatherRecord::from_current(&payload);

    record_search(&state, &record).await?;

    Ok(Json(WeatherResponse {
        success: true,
        weather: record.to_display(params.units),
    }))
}

#[derive(Deserialize)]
struct CoordinatesQuery {
    lat: Option<String>,
    lon: Option<String>,
    #[serde(default)]
    units: Units,
}

/// Look up current weather by coordinates and record the search.
async fn lookup_by_coordinates(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<CoordinatesQuery>,
) -> Result<Json<WeatherResponse>> {
    let lat = parse_coordinate(params.lat.as_deref(), "lat")?;
    let lon = parse_coordinate(params.lon.as_deref(), "lon")?;

    tracing::debug!(lat, lon, units = ?params.units, "Coordinate lookup");

    let payload = state
        .weather
        .current_by_coords(lat, lon, params.units)
        .await?;
    let record = WeatherRecord::from_current(&payload);

    record_search(&state, &record).await?;

    Ok(Json(WeatherResponse {
        success: true,
        weather: record.to_display(params.units),
    }))
}

/// Persist a lookup in the search history.
///
/// Incomplete upstream payloads produce invalid records, which are returned
/// to the client but never written to storage.
async fn record_search(state: &AppState, record: &WeatherRecord) -> Result<()> {
    if !record.is_valid() {
        tracing::debug!(city = %record.city, "Skipping history insert for invalid record");
        return Ok(());
    }

    state.db.add_history(&record.to_storage_document()).await?;
    Ok(())
}

// ─── Forecast ────────────────────────────────────────────────

/// One selected forecast day.
#[derive(Debug, Serialize)]
pub struct ForecastDay {
    /// Short formatted date of the forecast slot
    pub date: String,
    pub temperature: i64,
    pub description: String,
    pub icon: String,
    pub humidity: i64,
}

/// Forecast response: one entry per day for up to five days.
#[derive(Serialize)]
pub struct ForecastResponse {
    pub success: bool,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub units: Units,
    pub forecast: Vec<ForecastDay>,
}

/// Get a 5-day forecast for a city. Not persisted.
async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
    ApiQuery(params): ApiQuery<UnitsQuery>,
) -> Result<Json<ForecastResponse>> {
    tracing::debug!(city = %city, units = ?params.units, "Forecast lookup");

    let payload = state.weather.forecast_by_city(&city, params.units).await?;

    let forecast = select_daily(&payload.list)
        .into_iter()
        .map(|slot| {
            let condition = slot.weather.first();
            ForecastDay {
                date: chrono::DateTime::from_timestamp(slot.dt, 0)
                    .map(|d| d.format("%a, %b %-d").to_string())
                    .unwrap_or_default(),
                temperature: slot.main.temp.round() as i64,
                description: capitalize_first(
                    condition.map(|c| c.description.as_str()).unwrap_or(""),
                ),
                icon: icon_url(condition.map(|c| c.icon.as_str()).unwrap_or("")),
                humidity: slot.main.humidity,
            }
        })
        .collect();

    Ok(Json(ForecastResponse {
        success: true,
        city: payload.city.name,
        country: payload.city.country,
        units: params.units,
        forecast,
    }))
}

/// Pick one slot per day from a 3-hour-interval forecast list.
///
/// Keeps indices 0, 8, 16, 24, 32: the same time of day on each of the five
/// days, not a per-calendar-day aggregation.
fn select_daily(slots: &[ForecastSlot]) -> Vec<&ForecastSlot> {
    slots.iter().step_by(FORECAST_STRIDE).take(FORECAST_DAYS).collect()
}

// ─── History ─────────────────────────────────────────────────

/// Search history response, newest first.
#[derive(Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<WeatherDisplay>,
}

/// List the 10 most recent searches.
async fn list_history(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<UnitsQuery>,
) -> Result<Json<HistoryResponse>> {
    let entries = state.db.recent_history(HISTORY_LIMIT).await?;

    Ok(Json(HistoryResponse {
        success: true,
        history: entries.iter().map(|e| e.to_display(params.units)).collect(),
    }))
}

/// Response for bulk history deletion.
#[derive(Serialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub deleted: usize,
}

/// Delete all history entries.
async fn clear_history(State(state): State<Arc<AppState>>) -> Result<Json<ClearHistoryResponse>> {
    let deleted = state.db.clear_history().await?;

    Ok(Json(ClearHistoryResponse {
        success: true,
        deleted,
    }))
}

// ─── Favorites ───────────────────────────────────────────────

/// Favorite cities response.
#[derive(Serialize)]
pub struct FavoritesResponse {
    pub success: bool,
    pub favorites: Vec<WeatherDisplay>,
}

/// List all favorite cities.
async fn list_favorites(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<UnitsQuery>,
) -> Result<Json<FavoritesResponse>> {
    let entries = state.db.list_favorites().await?;

    Ok(Json(FavoritesResponse {
        success: true,
        favorites: entries.iter().map(|e| e.to_display(params.units)).collect(),
    }))
}

#[derive(Deserialize)]
struct AddFavoriteRequest {
    city: Option<String>,
}

/// Response for adding a favorite.
#[derive(Serialize)]
pub struct AddFavoriteResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<WeatherDisplay>,
}

/// Add a city to favorites.
///
/// Uniqueness is an exact case-sensitive match on the requested name,
/// checked before the insert. Concurrent adds for the same city may race
/// past this check and both insert; there is no storage-level constraint.
async fn add_favorite(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<AddFavoriteRequest>,
) -> Result<Json<AddFavoriteResponse>> {
    let city = body
        .city
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("'city' is required".to_string()))?;

    if state.db.find_favorite_by_city(&city).await?.is_some() {
        tracing::debug!(city = %city, "Favorite already exists");
        return Ok(Json(AddFavoriteResponse {
            success: true,
            message: format!("'{}' is already in favorites", city),
            favorite: None,
        }));
    }

    let payload = state.weather.current_by_city(&city, Units::Metric).await?;
    let record = WeatherRecord::from_current(&payload);

    if !record.is_valid() {
        return Err(anyhow::anyhow!("upstream returned an incomplete weather record").into());
    }

    let saved = state.db.add_favorite(&record.to_storage_document()).await?;
    tracing::info!(city = %record.city, id = ?saved.id, "Favorite added");

    Ok(Json(AddFavoriteResponse {
        success: true,
        message: format!("'{}' added to favorites", record.city),
        favorite: Some(saved.to_display(Units::Metric)),
    }))
}

/// Response for removing a favorite.
#[derive(Serialize)]
pub struct RemoveFavoriteResponse {
    pub success: bool,
    pub message: String,
}

/// Remove a favorite by its document id.
async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RemoveFavoriteResponse>> {
    validate_document_id(&id)?;

    if state.db.get_favorite(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("favorite '{}' not found", id)));
    }

    state.db.delete_favorite(&id).await?;
    tracing::info!(id = %id, "Favorite removed");

    Ok(Json(RemoveFavoriteResponse {
        success: true,
        message: "favorite removed".to_string(),
    }))
}

// ─── Input Validation ────────────────────────────────────────

/// Parse a coordinate query parameter, rejecting anything that is not a
/// finite number before any upstream or storage call.
fn parse_coordinate(value: Option<&str>, name: &str) -> Result<f64> {
    let raw = value.ok_or_else(|| {
        AppError::BadRequest(format!("missing required query parameter '{}'", name))
    })?;

    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("'{}' must be a number", name)))
}

/// Reject malformed document ids before touching storage.
fn validate_document_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains('/') || id.len() > MAX_DOCUMENT_ID_BYTES {
        return Err(AppError::BadRequest(format!("malformed favorite id '{}'", id)));
    }
    Ok(())
}
