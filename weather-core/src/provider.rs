use crate::{
    Config,
    error::WeatherError,
    geocode::LocationResolver,
    http::HttpFetcher,
    model::{Coordinates, WeatherResult},
    provider::{onecall::OneCallProvider, split::SplitProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod onecall;
pub mod split;

/// Upper bound on the number of daily entries any provider returns.
pub const MAX_DAILY_ENTRIES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    /// Combined current + daily forecast endpoint.
    OneCall,
    /// Current-conditions and 3-hourly forecast endpoints.
    Split,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OneCall => "onecall",
            ProviderId::Split => "split",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OneCall, ProviderId::Split]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "onecall" => Ok(ProviderId::OneCall),
            "split" => Ok(ProviderId::Split),
            _ => Err(anyhow::anyhow!("Unknown provider '{value}'. Supported providers: onecall, split.")),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Fetch weather for `coords`.
    ///
    /// `city_name` is a name already resolved by forward geocoding. When it is
    /// `None` the provider names the location itself.
    async fn get_weather(
        &self,
        coords: Coordinates,
        city_name: Option<&str>,
    ) -> Result<WeatherResult, WeatherError>;
}

/// Which provider to try next after `id` failed with `err`, if any.
pub fn fallback_for(id: ProviderId, err: &WeatherError) -> Option<ProviderId> {
    match (id, err) {
        (ProviderId::OneCall, WeatherError::Authorization { .. }) => Some(ProviderId::Split),
        _ => None,
    }
}

/// Request parameters shared by every OpenWeather data endpoint.
#[derive(Debug, Clone)]
pub struct ApiParams {
    pub api_base: String,
    pub api_key: String,
    pub units: String,
    pub lang: String,
}

impl ApiParams {
    /// Fails with `MissingCredential` when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config.api_key().ok_or(WeatherError::MissingCredential)?;

        Ok(Self {
            api_base: config.api_base().to_string(),
            api_key: api_key.to_string(),
            units: config.units().to_string(),
            lang: config.lang().to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    pub(crate) fn coords_query(&self, coords: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("units", self.units.clone()),
            ("lang", self.lang.clone()),
            ("appid", self.api_key.clone()),
        ]
    }
}

/// Construct a provider by id.
pub fn build_provider(
    id: ProviderId,
    params: &ApiParams,
    http: &HttpFetcher,
    resolver: &LocationResolver,
) -> Box<dyn WeatherProvider> {
    match id {
        ProviderId::OneCall => {
            Box::new(OneCallProvider::new(params.clone(), http.clone(), resolver.clone()))
        }
        ProviderId::Split => Box::new(SplitProvider::new(params.clone(), http.clone())),
    }
}
