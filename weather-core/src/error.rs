use thiserror::Error;

/// Errors surfaced by the weather service and its collaborators.
///
/// `Authorization` is recoverable: the service intercepts it and retries the
/// request through the split provider. Every other variant reaches the caller
/// unchanged.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "Missing OpenWeather API key.\n\
         Hint: run `weather configure` or set OPENWEATHER_API_KEY."
    )]
    MissingCredential,

    #[error("City not found: {query}")]
    NotFound { query: String },

    #[error("Credentials are not authorized for {endpoint} (HTTP 401)")]
    Authorization { endpoint: String, body: String },

    #[error("HTTP {status}: {}", truncate_body(.body))]
    Http { status: u16, body: String },

    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedBody { endpoint: String, reason: String },

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),
}

impl WeatherError {
    /// HTTP status carried by the error, if it came from a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherError::Http { status, .. } => Some(*status),
            WeatherError::Authorization { .. } => Some(401),
            _ => None,
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, WeatherError::Authorization { .. })
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
