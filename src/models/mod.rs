// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod weather;

pub use weather::{StoredWeather, Units, WeatherDisplay, WeatherRecord};
