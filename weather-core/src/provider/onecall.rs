use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    error::WeatherError,
    geocode::LocationResolver,
    http::HttpFetcher,
    model::{Coordinates, CurrentConditions, DailyForecastEntry, WeatherResult},
};

use super::{ApiParams, MAX_DAILY_ENTRIES, ProviderId, WeatherProvider};

const ONECALL_PATH: &str = "/data/2.5/onecall";
const EXCLUDE: &str = "minutely,hourly,alerts";

/// Combined current + daily endpoint. Keys without One Call access get a 401.
#[derive(Debug, Clone)]
pub struct OneCallProvider {
    params: ApiParams,
    http: HttpFetcher,
    resolver: LocationResolver,
}

#[derive(Debug, Deserialize)]
struct OcResponse {
    #[serde(default)]
    current: CurrentConditions,
    #[serde(default)]
    daily: Vec<DailyForecastEntry>,
    timezone_offset: Option<i64>,
}

impl OneCallProvider {
    pub fn new(params: ApiParams, http: HttpFetcher, resolver: LocationResolver) -> Self {
        Self { params, http, resolver }
    }

    async fn fetch(&self, coords: Coordinates) -> Result<OcResponse, WeatherError> {
        let url = self.params.url(ONECALL_PATH);
        let mut query = self.params.coords_query(coords);
        query.push(("exclude", EXCLUDE.to_string()));

        match self.http.fetch_json(&url, &query).await {
            Ok(body) => body.decode("onecall"),
            Err(WeatherError::Http { status: 401, body }) => {
                Err(WeatherError::Authorization { endpoint: "onecall".to_string(), body })
            }
            Err(e) => Err(e),
        }
    }
}

fn assemble(data: OcResponse, city_name: String) -> WeatherResult {
    let mut current = data.current;
    current.name = city_name.clone();
    current.timezone_offset = data.timezone_offset;

    let offset = data.timezone_offset.unwrap_or(0);
    let daily = data
        .daily
        .into_iter()
        .take(MAX_DAILY_ENTRIES)
        .map(|entry| DailyForecastEntry { timezone_offset: offset, ..entry })
        .collect();

    WeatherResult { current, daily, city_name }
}

#[async_trait]
impl WeatherProvider for OneCallProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OneCall
    }

    async fn get_weather(
        &self,
        coords: Coordinates,
        city_name: Option<&str>,
    ) -> Result<WeatherResult, WeatherError> {
        let (data, city_name) = match city_name {
            Some(name) => (self.fetch(coords).await?, name.to_string()),
            None => {
                // Reverse lookup is best-effort and never fails.
                let (data, name) = tokio::join!(self.fetch(coords), self.resolver.reverse(coords));
                (data?, name)
            }
        };

        Ok(assemble(data, city_name))
    }
}
