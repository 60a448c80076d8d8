// SPDX-License-Identifier: MIT

//! Skycast: weather lookup API with search history and favorite cities.
//!
//! This crate provides a thin HTTP proxy in front of the OpenWeather API.
//! Lookups are reshaped into a normalized record and written to a search
//! history collection, and cities can be pinned as favorites.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::WeatherDb;
use services::OpenWeatherClient;

/// Shared application state.
///
/// Handlers receive this via `State` extraction; the database handle and
/// upstream client are constructed once at startup and cloned per use.
pub struct AppState {
    pub config: Config,
    pub db: WeatherDb,
    pub weather: OpenWeatherClient,
}
