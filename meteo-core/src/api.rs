//! URL templating and the single HTTP call every adapter goes through.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::{Url, form_urlencoded};

use crate::{
    Config,
    error::{ApiError, ApiResult},
    model::Coordinates,
};

const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

const WEATHER_QUERY: &str =
    "?appId={{apiKey}}&lat={{lat}}&lon={{long}}&units=metric&lang={{lang}}";
const CITY_LOOKUP_QUERY: &str = "?q={{cityName}}&type=municipality&postcode={{postCode}}";
const CITY_SUGGESTIONS_QUERY: &str = "?q={{cityName}}&type=municipality";

/// A URL with `{{name}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitutes every `{{name}}` with the percent-encoded value and parses the result.
    pub fn expand(&self, vars: &[(&str, &str)]) -> ApiResult<Url> {
        let mut out = self.0.clone();

        for (name, value) in vars {
            let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
            out = out.replace(&format!("{{{{{name}}}}}"), &encoded);
        }

        if let Some(start) = out.find("{{") {
            let rest = &out[start + 2..];
            let name = rest.split("}}").next().unwrap_or(rest);
            return Err(ApiError::UnfilledPlaceholder(name.to_string()));
        }

        Ok(Url::parse(&out)?)
    }
}

/// The three request templates, anchored on the configured endpoints.
#[derive(Debug, Clone)]
pub struct UrlTemplates {
    pub weather: UrlTemplate,
    pub city_lookup: UrlTemplate,
    pub city_suggestions: UrlTemplate,
}

impl UrlTemplates {
    pub fn new(weather_base: &str, geocoding_base: &str) -> Self {
        Self {
            weather: UrlTemplate::new([weather_base, WEATHER_QUERY].concat()),
            city_lookup: UrlTemplate::new([geocoding_base, CITY_LOOKUP_QUERY].concat()),
            city_suggestions: UrlTemplate::new([geocoding_base, CITY_SUGGESTIONS_QUERY].concat()),
        }
    }
}

/// Shared HTTP client for the weather and geocoding adapters.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    templates: UrlTemplates,
    api_key: String,
    lang: String,
}

impl ApiClient {
    pub fn new(
        templates: UrlTemplates,
        api_key: String,
        lang: String,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { http, templates, api_key, lang })
    }

    /// Build a client from the endpoints, key and language in `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?.to_owned();
        let templates = UrlTemplates::new(&config.endpoints.weather, &config.endpoints.geocoding);

        Ok(Self::new(
            templates,
            api_key,
            config.lang.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)
    }

    pub fn weather_url(&self, at: Coordinates) -> ApiResult<Url> {
        let lat = at.lat.to_string();
        let long = at.long.to_string();

        self.templates.weather.expand(&[
            ("apiKey", &self.api_key),
            ("lat", &lat),
            ("long", &long),
            ("lang", &self.lang),
        ])
    }

    /// A missing postcode is sent as an empty `postcode=` parameter.
    pub fn city_lookup_url(&self, city_name: &str, post_code: Option<&str>) -> ApiResult<Url> {
        self.templates
            .city_lookup
            .expand(&[("cityName", city_name), ("postCode", post_code.unwrap_or(""))])
    }

    pub fn city_suggestions_url(&self, city_name: &str) -> ApiResult<Url> {
        self.templates.city_suggestions.expand(&[("cityName", city_name)])
    }

    /// GET `url` and decode the JSON body.
    ///
    /// Returns `Ok(None)` on a non-success status. Transport failures are
    /// logged and returned as [`ApiError::Transport`].
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        what: &'static str,
    ) -> ApiResult<Option<T>> {
        let shown = redact(&url);
        tracing::debug!(url = %shown, "GET {what}");

        let res = match self.http.get(url).send().await {
            Ok(res) => res,
            Err(source) => {
                tracing::error!(url = %shown, error = %source, "{what} request failed");
                return Err(ApiError::Transport { url: shown, source });
            }
        };

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(url = %shown, %status, "{what} request returned non-success status");
            return Ok(None);
        }

        let body = match res.text().await {
            Ok(body) => body,
            Err(source) => {
                tracing::error!(url = %shown, error = %source, "failed to read {what} body");
                return Err(ApiError::Transport { url: shown, source });
            }
        };

        let parsed =
            serde_json::from_str(&body).map_err(|source| ApiError::Decode { what, source })?;
        Ok(Some(parsed))
    }
}

/// URL as text with the `appId` value masked, for logs and error messages.
fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "appId") {
        return url.to_string();
    }

    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appId" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(weather_base: &str, geocoding_base: &str) -> ApiClient {
        ApiClient::new(
            UrlTemplates::new(weather_base, geocoding_base),
            "SECRET".into(),
            "fr".into(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn mock_client(server: &MockServer) -> ApiClient {
        client(&format!("{}/weather", server.uri()), &format!("{}/search/", server.uri()))
    }

    #[test]
    fn expand_fills_and_encodes_placeholders() {
        let tpl =
            UrlTemplate::new("https://example.org/search/?q={{cityName}}&postcode={{postCode}}");
        let url = tpl.expand(&[("cityName", "Saint Denis&co"), ("postCode", "93200")]).unwrap();

        assert_eq!(url.as_str(), "https://example.org/search/?q=Saint+Denis%26co&postcode=93200");
    }

    #[test]
    fn expand_reports_unfilled_placeholder() {
        let tpl = UrlTemplate::new("https://example.org/?q={{cityName}}&postcode={{postCode}}");
        let err = tpl.expand(&[("cityName", "Lyon")]).unwrap_err();

        assert!(matches!(err, ApiError::UnfilledPlaceholder(ref name) if name == "postCode"));
    }

    #[test]
    fn weather_url_carries_all_parameters() {
        let api = client("https://api.example/weather", "https://geo.example/search/");
        let url = api.weather_url(Coordinates::new(48.85, 2.35)).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.example/weather?appId=SECRET&lat=48.85&lon=2.35&units=metric&lang=fr"
        );
    }

    #[test]
    fn city_lookup_url_without_postcode_sends_empty_value() {
        let api = client("https://api.example/weather", "https://geo.example/search/");
        let url = api.city_lookup_url("Lyon", None).unwrap();

        assert_eq!(url.as_str(), "https://geo.example/search/?q=Lyon&type=municipality&postcode=");
    }

    #[test]
    fn suggestions_url_has_no_postcode() {
        let api = client("https://api.example/weather", "https://geo.example/search/");
        let url = api.city_suggestions_url("Par").unwrap();

        assert_eq!(url.as_str(), "https://geo.example/search/?q=Par&type=municipality");
    }

    #[test]
    fn redact_masks_api_key() {
        let url = Url::parse("https://api.example/weather?appId=SECRET&lat=1").unwrap();
        let shown = redact(&url);

        assert!(!shown.contains("SECRET"));
        assert!(shown.contains("lat=1"));
    }

    #[tokio::test]
    async fn get_json_decodes_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/"))
            .and(query_param("q", "Lyon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let api = mock_client(&server);
        let url = api.city_suggestions_url("Lyon").unwrap();
        let body: Option<Value> = api.get_json(url, "test").await.unwrap();

        assert_eq!(body, Some(serde_json::json!({"ok": true})));
    }

    #[tokio::test]
    async fn get_json_returns_none_on_non_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = mock_client(&server);
        let url = api.weather_url(Coordinates::new(1.0, 2.0)).unwrap();
        let body: Option<Value> = api.get_json(url, "test").await.unwrap();

        assert!(body.is_none());
    }

    #[tokio::test]
    async fn get_json_reports_bad_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let api = mock_client(&server);
        let url = api.weather_url(Coordinates::new(1.0, 2.0)).unwrap();
        let err = api.get_json::<Value>(url, "weather").await.unwrap_err();

        assert!(matches!(err, ApiError::Decode { what: "weather", .. }));
    }

    #[tokio::test]
    async fn get_json_propagates_transport_failure() {
        // Port 9 on localhost is not listening.
        let api = client("http://127.0.0.1:9/weather", "http://127.0.0.1:9/search/");
        let url = api.weather_url(Coordinates::new(1.0, 2.0)).unwrap();
        let err = api.get_json::<Value>(url, "weather").await.unwrap_err();

        match err {
            ApiError::Transport { url, .. } => assert!(!url.contains("SECRET")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
