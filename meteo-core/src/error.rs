use thiserror::Error;

/// Errors raised while talking to the weather and geocoding APIs.
///
/// An HTTP non-success status is not an error: the client reports it as
/// "no result" so callers can degrade to a not-found view.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse {what} JSON: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{what} response has no {field}")]
    MissingField {
        what: &'static str,
        field: &'static str,
    },

    #[error("URL template still contains placeholder '{0}' after expansion")]
    UnfilledPlaceholder(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type ApiResult<T> = Result<T, ApiError>;
