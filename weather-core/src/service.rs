use anyhow::Result;
use serde_json::Value;

use crate::{
    Config,
    error::WeatherError,
    geocode::LocationResolver,
    http::{Body, HttpFetcher},
    model::{Coordinates, WeatherQuery, WeatherResult},
    provider::{ApiParams, ProviderId, build_provider, fallback_for},
};

const PROXY_PATH: &str = "/api/weather";

/// What an entry point hands to presentation.
///
/// Proxy responses are passed through untouched, so they stay a [`Body`]
/// until the caller decides to decode them.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPayload {
    Direct(WeatherResult),
    Proxied(Body),
}

impl WeatherPayload {
    /// Typed view of the payload. Fails for proxy bodies that are not a `WeatherResult`.
    pub fn into_result(self) -> Result<WeatherResult, WeatherError> {
        match self {
            WeatherPayload::Direct(result) => Ok(result),
            WeatherPayload::Proxied(body) => body.decode("weather proxy"),
        }
    }

    /// JSON view; raw proxy text becomes a JSON string.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            WeatherPayload::Direct(result) => serde_json::to_value(result),
            WeatherPayload::Proxied(Body::Structured(value)) => Ok(value.clone()),
            WeatherPayload::Proxied(Body::Raw(text)) => Ok(Value::String(text.clone())),
        }
    }
}

/// Public entry points: by city name and by coordinates.
#[derive(Debug, Clone)]
pub struct WeatherService {
    config: Config,
    first_provider: ProviderId,
    http: HttpFetcher,
}

impl WeatherService {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_http(config, HttpFetcher::new()?)
    }

    pub fn with_http(config: Config, http: HttpFetcher) -> Result<Self> {
        // The provider pin only matters for direct requests.
        let first_provider = match config.backend_url() {
            Some(_) => ProviderId::OneCall,
            None => config.provider_id()?,
        };

        match (config.backend_url(), config.masked_api_key()) {
            (Some(url), _) => tracing::debug!("Using weather proxy at {url}"),
            (None, Some(key)) => tracing::debug!("OpenWeather key present: {key}"),
            (None, None) => tracing::debug!("OpenWeather key is missing or empty"),
        }

        Ok(Self { config, first_provider, http })
    }

    pub async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherPayload, WeatherError> {
        match query {
            WeatherQuery::City(city) => self.get_weather_by_city(city).await,
            WeatherQuery::Coords(coords) => self.get_weather_by_coords(*coords).await,
        }
    }

    pub async fn get_weather_by_city(&self, city: &str) -> Result<WeatherPayload, WeatherError> {
        if let Some(base) = self.config.backend_url() {
            return self.proxy(base, &[("city", city)]).await;
        }

        let params = ApiParams::from_config(&self.config)?;
        let resolver = self.resolver(&params);

        let location = resolver.forward(city).await?;
        let result =
            self.run_providers(&params, &resolver, location.coords, Some(&location.display_name)).await?;

        Ok(WeatherPayload::Direct(result))
    }

    pub async fn get_weather_by_coords(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherPayload, WeatherError> {
        if let Some(base) = self.config.backend_url() {
            let lat = coords.lat.to_string();
            let lon = coords.lon.to_string();
            return self.proxy(base, &[("lat", lat.as_str()), ("lon", lon.as_str())]).await;
        }

        let params = ApiParams::from_config(&self.config)?;
        let resolver = self.resolver(&params);

        let result = self.run_providers(&params, &resolver, coords, None).await?;

        Ok(WeatherPayload::Direct(result))
    }

    fn resolver(&self, params: &ApiParams) -> LocationResolver {
        LocationResolver::new(self.http.clone(), &params.api_base, &params.api_key)
    }

    async fn proxy(&self, base: &str, query: &[(&str, &str)]) -> Result<WeatherPayload, WeatherError> {
        let url = format!("{base}{PROXY_PATH}");
        let body = self.http.fetch_json(&url, query).await?;
        Ok(WeatherPayload::Proxied(body))
    }

    /// Try the configured provider, then whatever `fallback_for` selects.
    async fn run_providers(
        &self,
        params: &ApiParams,
        resolver: &LocationResolver,
        coords: Coordinates,
        city_name: Option<&str>,
    ) -> Result<WeatherResult, WeatherError> {
        let mut id = self.first_provider;

        loop {
            let provider = build_provider(id, params, &self.http, resolver);

            match provider.get_weather(coords, city_name).await {
                Ok(result) => return Ok(result),
                Err(err) => match fallback_for(id, &err) {
                    Some(next) => {
                        tracing::warn!("{id} rejected the request ({err}), falling back to {next}");
                        id = next;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}
