//! In-memory weather and geocoding sources for unit tests.

use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    error::{ApiError, ApiResult},
    geocoding::Geocoder,
    model::{CitySuggestion, Coordinates, WeatherRecord},
    weather::WeatherSource,
};

pub fn sample_record() -> WeatherRecord {
    WeatherRecord {
        city_name: "Lyon".into(),
        img: "04d".into(),
        description: "nuageux".into(),
        country: "FR".into(),
        temp: 21.5,
        clouds: 75,
        humidity: 56,
        pressure: 1013,
        wind_direction: 230.0,
        wind_speed: 5.0,
    }
}

pub const LYON: Coordinates = Coordinates { lat: 45.764, long: 4.8357 };

/// Knows Lyon only; counts calls.
#[derive(Debug, Clone, Default)]
pub struct FakeGeocoder {
    suggestion_calls: Arc<AtomicUsize>,
    lookup_calls: Arc<AtomicUsize>,
}

impl FakeGeocoder {
    pub fn suggestion_calls(&self) -> usize {
        self.suggestion_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn suggestions(&self, _city_name: &str) -> ApiResult<Vec<CitySuggestion>> {
        self.suggestion_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            CitySuggestion { city_name: "Paris".into(), post_code: Some("75001".into()) },
            CitySuggestion { city_name: "Parthenay".into(), post_code: Some("79200".into()) },
        ])
    }

    async fn coordinates_of(
        &self,
        city_name: &str,
        _post_code: Option<&str>,
    ) -> ApiResult<Option<Coordinates>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        Ok((city_name == "Lyon").then_some(LYON))
    }
}

/// Suggestions always fail; lookups find Lyon.
#[derive(Debug, Clone, Copy)]
pub struct FailingSuggestions;

#[async_trait]
impl Geocoder for FailingSuggestions {
    async fn suggestions(&self, _city_name: &str) -> ApiResult<Vec<CitySuggestion>> {
        Err(ApiError::MissingField { what: "city suggestions", field: "features" })
    }

    async fn coordinates_of(
        &self,
        _city_name: &str,
        _post_code: Option<&str>,
    ) -> ApiResult<Option<Coordinates>> {
        Ok(Some(LYON))
    }
}

/// Returns [`sample_record`] for every point unless built with `unavailable`.
#[derive(Debug, Clone, Default)]
pub struct FakeWeather {
    unavailable: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeWeather {
    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn current(&self, _at: Coordinates) -> ApiResult<Option<WeatherRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((!self.unavailable).then(sample_record))
    }
}
