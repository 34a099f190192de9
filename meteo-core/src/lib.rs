//! Core library for the `meteo` weather lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The API client and the weather / geocoding adapters built on it
//! - The map controller and the state it drives
//! - Rendering of weather records (popup table, card, suggestions)
//!
//! It is used by `meteo-cli`, but can also be reused by other front ends.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod map;
pub mod model;
pub mod render;
pub mod search;
pub mod weather;

#[cfg(test)]
mod testing;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use geocoding::{AdresseGeocoder, Geocoder};
pub use map::{MapController, controller_from_config};
pub use model::{CitySuggestion, Coordinates, SearchInput, WeatherRecord};
pub use render::{DetailsTable, WeatherCard};
pub use search::SearchParse;
pub use weather::{OpenWeatherAdapter, WeatherSource};
