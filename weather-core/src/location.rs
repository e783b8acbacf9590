//! Device location acquisition.

use std::time::Duration;

use async_trait::async_trait;

use crate::{error::WeatherError, model::Coordinates};

#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, WeatherError>;
}

/// Reports fixed coordinates, typically the `home` entry of the config.
#[derive(Debug, Clone)]
pub struct StaticLocation {
    coords: Option<Coordinates>,
}

impl StaticLocation {
    pub fn new(coords: Option<Coordinates>) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl LocationSource for StaticLocation {
    async fn current_position(&self) -> Result<Coordinates, WeatherError> {
        self.coords.ok_or_else(|| {
            WeatherError::LocationUnavailable(
                "no home location configured; add [home] lat/lon to the config".to_string(),
            )
        })
    }
}

/// Acquire coordinates from `source`, giving up after `timeout`.
///
/// The timeout covers acquisition only, never the weather request that follows.
pub async fn locate(
    source: &dyn LocationSource,
    timeout: Option<Duration>,
) -> Result<Coordinates, WeatherError> {
    match timeout {
        None => source.current_position().await,
        Some(limit) => tokio::time::timeout(limit, source.current_position())
            .await
            .map_err(|_| {
                WeatherError::LocationUnavailable(format!("timed out after {}s", limit.as_secs_f64()))
            })?,
    }
}
