use std::time::Duration;

use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::WeatherError;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("weather-cli/", env!("CARGO_PKG_VERSION"));

/// A successful response body: parsed JSON when possible, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Structured(Value),
    Raw(String),
}

impl Body {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Body::Structured(value),
            Err(_) => Body::Raw(text),
        }
    }

    /// Decode a structured body into a provider payload.
    pub fn decode<T: DeserializeOwned>(self, endpoint: &str) -> Result<T, WeatherError> {
        match self {
            Body::Structured(value) => {
                serde_json::from_value(value).map_err(|e| WeatherError::UnexpectedBody {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })
            }
            Body::Raw(text) => Err(WeatherError::UnexpectedBody {
                endpoint: endpoint.to_string(),
                reason: format!("expected JSON, got {} bytes of text", text.len()),
            }),
        }
    }
}

/// Thin wrapper over a shared `reqwest::Client`. No retries happen here.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| WeatherError::Transport { url: String::new(), source })?;

        Ok(Self { http })
    }

    /// GET `url` with `query`, reading the full body regardless of status.
    ///
    /// Non-success statuses become `WeatherError::Http` with the raw body.
    pub async fn fetch_json<Q>(&self, url: &str, query: &Q) -> Result<Body, WeatherError>
    where
        Q: Serialize + ?Sized,
    {
        tracing::debug!(url, "GET");

        let transport = |source: reqwest::Error| WeatherError::Transport { url: url.to_string(), source };

        let res = self.http.get(url).query(query).send().await.map_err(transport)?;

        let status = res.status();
        let body = res.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(WeatherError::Http { status: status.as_u16(), body });
        }

        Ok(Body::parse(body))
    }
}
