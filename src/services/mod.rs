// SPDX-License-Identifier: MIT

//! Services module - upstream integrations.

pub mod openweather;

pub use openweather::OpenWeatherClient;
