//! Forward and reverse geocoding against the OpenWeather geo API.

use serde::Deserialize;

use crate::{error::WeatherError, http::HttpFetcher, model::Coordinates};

const DIRECT_PATH: &str = "/geo/1.0/direct";
const REVERSE_PATH: &str = "/geo/1.0/reverse";

#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: Option<String>,
    lat: f64,
    lon: f64,
    country: Option<String>,
    state: Option<String>,
}

impl GeoEntry {
    fn display_name(&self) -> String {
        display_name(self.name.as_deref(), self.state.as_deref(), self.country.as_deref())
    }
}

/// A place name resolved to coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coords: Coordinates,
    pub display_name: String,
}

/// Join `name, state, country`, skipping absent or empty parts.
pub fn display_name(name: Option<&str>, state: Option<&str>, country: Option<&str>) -> String {
    [name, state, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    http: HttpFetcher,
    api_base: String,
    api_key: String,
}

impl LocationResolver {
    pub fn new(http: HttpFetcher, api_base: &str, api_key: &str) -> Self {
        Self { http, api_base: api_base.to_string(), api_key: api_key.to_string() }
    }

    /// Place name to coordinates. Fails with `NotFound` when nothing matches.
    pub async fn forward(&self, city: &str) -> Result<ResolvedLocation, WeatherError> {
        let url = format!("{}{DIRECT_PATH}", self.api_base);

        let entries: Vec<GeoEntry> = self
            .http
            .fetch_json(&url, &[("q", city), ("limit", "1"), ("appid", self.api_key.as_str())])
            .await?
            .decode("geocoding")?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound { query: city.to_string() })?;

        let resolved = ResolvedLocation {
            coords: Coordinates::new(entry.lat, entry.lon),
            display_name: entry.display_name(),
        };
        tracing::debug!(
            "Geocoded {city:?} to {} ({}, {})",
            resolved.display_name,
            resolved.coords.lat,
            resolved.coords.lon
        );

        Ok(resolved)
    }

    /// Coordinates to a display name. Never fails: any error yields `""`.
    pub async fn reverse(&self, coords: Coordinates) -> String {
        match self.try_reverse(coords).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                tracing::debug!("Reverse geocoding returned no results");
                String::new()
            }
            Err(e) => {
                tracing::debug!("Reverse geocoding failed: {e}");
                String::new()
            }
        }
    }

    async fn try_reverse(&self, coords: Coordinates) -> Result<Option<String>, WeatherError> {
        let url = format!("{}{REVERSE_PATH}", self.api_base);
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        let entries: Vec<GeoEntry> = self
            .http
            .fetch_json(
                &url,
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("limit", "1"),
                    ("appid", self.api_key.as_str()),
                ],
            )
            .await?
            .decode("reverse geocoding")?;

        Ok(entries.first().map(GeoEntry::display_name))
    }
}
