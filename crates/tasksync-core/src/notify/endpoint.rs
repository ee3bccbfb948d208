use thiserror::Error;
use url::Url;

/// Why a configured webhook URL was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("webhook URL is not a valid URL: {0}")]
    Unparseable(String),

    #[error("webhook URL must be http(s), got '{0}:'")]
    UnsupportedScheme(String),
}

/// Parse a webhook URL, accepting only `http` and `https`.
pub fn validate_endpoint(raw: &str) -> Result<Url, EndpointError> {
    let url = Url::parse(raw.trim()).map_err(|e| EndpointError::Unparseable(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(EndpointError::UnsupportedScheme(other.to_string())),
    }
}
