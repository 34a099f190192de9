use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    api::ApiClient,
    error::ApiResult,
    model::{CitySuggestion, Coordinates},
};

/// City name → coordinates, and city name → autocomplete candidates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Every municipality matching `city_name`; empty when nothing matched.
    async fn suggestions(&self, city_name: &str) -> ApiResult<Vec<CitySuggestion>>;

    /// Coordinates of the best match, or `None` if nothing matched.
    async fn coordinates_of(
        &self,
        city_name: &str,
        post_code: Option<&str>,
    ) -> ApiResult<Option<Coordinates>>;
}

/// French national address API (api-adresse.data.gouv.fr).
#[derive(Debug, Clone)]
pub struct AdresseGeocoder {
    api: ApiClient,
}

impl AdresseGeocoder {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Geocoder for AdresseGeocoder {
    async fn suggestions(&self, city_name: &str) -> ApiResult<Vec<CitySuggestion>> {
        let url = self.api.city_suggestions_url(city_name)?;
        let res: Option<SuggestionCollection> = self.api.get_json(url, "city suggestions").await?;

        let suggestions: Vec<CitySuggestion> = res
            .map(|collection| collection.features.into_iter().map(CitySuggestion::from).collect())
            .unwrap_or_default();

        tracing::debug!(city_name, count = suggestions.len(), "city suggestions");
        Ok(suggestions)
    }

    async fn coordinates_of(
        &self,
        city_name: &str,
        post_code: Option<&str>,
    ) -> ApiResult<Option<Coordinates>> {
        let url = self.api.city_lookup_url(city_name, post_code)?;
        let res: Option<LookupCollection> = self.api.get_json(url, "city lookup").await?;

        let found = res
            .and_then(|collection| collection.features.into_iter().next())
            .map(|feature| feature.geometry.to_coordinates());

        tracing::debug!(city_name, ?post_code, ?found, "city lookup");
        Ok(found)
    }
}

#[derive(Debug, Deserialize)]
struct SuggestionProperties {
    label: String,
    postcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionFeature {
    properties: SuggestionProperties,
}

#[derive(Debug, Deserialize)]
struct SuggestionCollection {
    features: Vec<SuggestionFeature>,
}

impl From<SuggestionFeature> for CitySuggestion {
    fn from(feature: SuggestionFeature) -> Self {
        CitySuggestion {
            city_name: feature.properties.label,
            post_code: feature.properties.postcode,
        }
    }
}

/// GeoJSON point; `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: [f64; 2],
}

impl PointGeometry {
    fn to_coordinates(&self) -> Coordinates {
        let [long, lat] = self.coordinates;
        Coordinates { lat, long }
    }
}

#[derive(Debug, Deserialize)]
struct LookupFeature {
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
struct LookupCollection {
    features: Vec<LookupFeature>,
}
