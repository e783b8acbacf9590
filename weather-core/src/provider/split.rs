//! Fallback provider built on the free `/weather` and `/forecast` endpoints.
//!
//! The 3-hourly forecast is folded into daily entries: entries are grouped by
//! their UTC calendar date (the location's offset is not applied), at most
//! [`MAX_DAILY_ENTRIES`] days are kept in first-seen order, and each day takes
//! its icon, description, `dt` and `temp.day` from the middle entry of the group.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::{
    error::WeatherError,
    http::HttpFetcher,
    model::{Condition, Coordinates, CurrentConditions, DailyForecastEntry, DailyTemp, WeatherResult},
};

use super::{ApiParams, MAX_DAILY_ENTRIES, ProviderId, WeatherProvider};

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct SplitProvider {
    params: ApiParams,
    http: HttpFetcher,
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    wind: OwWind,
    timezone: Option<i64>,
    #[serde(default)]
    sys: OwSys,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastMain {
    pub temp: Option<f64>,
}

/// One 3-hourly item of the `/forecast` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastEntry {
    pub dt: Option<i64>,
    #[serde(default)]
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Default, Deserialize)]
struct OwForecastResponse {
    list: Option<Vec<ForecastEntry>>,
}

impl SplitProvider {
    pub fn new(params: ApiParams, http: HttpFetcher) -> Self {
        Self { params, http }
    }
}

fn normalize_current(resp: OwCurrentResponse) -> CurrentConditions {
    CurrentConditions {
        name: resp.name.unwrap_or_default(),
        temp: resp.main.temp,
        feels_like: resp.main.feels_like,
        humidity: resp.main.humidity,
        wind_speed: resp.wind.speed,
        timezone_offset: resp.timezone,
        sunrise: resp.sys.sunrise,
        sunset: resp.sys.sunset,
        weather: resp.weather,
        ..Default::default()
    }
}

fn utc_date(dt: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(dt, 0).map(|t| t.date_naive())
}

/// Fold 3-hourly entries into at most eight daily entries.
pub fn synthesize_daily(entries: &[ForecastEntry], timezone_offset: i64) -> Vec<DailyForecastEntry> {
    let mut groups: Vec<(NaiveDate, Vec<(i64, &ForecastEntry)>)> = Vec::new();

    for entry in entries {
        let Some((dt, day)) = entry.dt.and_then(|dt| utc_date(dt).map(|day| (dt, day))) else {
            tracing::warn!("Skipping forecast entry without a usable timestamp");
            continue;
        };

        if let Some((_, items)) = groups.iter_mut().find(|(d, _)| *d == day) {
            items.push((dt, entry));
        } else if groups.len() < MAX_DAILY_ENTRIES {
            groups.push((day, vec![(dt, entry)]));
        }
    }

    groups
        .into_iter()
        .map(|(_, items)| {
            let temps = items.iter().filter_map(|(_, i)| i.main.temp);
            let min = temps.clone().reduce(f64::min);
            let max = temps.reduce(f64::max);

            let (dt, rep) = items[items.len() / 2];

            DailyForecastEntry {
                dt,
                temp: DailyTemp { min, max, day: rep.main.temp, ..Default::default() },
                weather: rep.weather.clone(),
                timezone_offset,
                ..Default::default()
            }
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for SplitProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Split
    }

    async fn get_weather(
        &self,
        coords: Coordinates,
        city_name: Option<&str>,
    ) -> Result<WeatherResult, WeatherError> {
        let current_url = self.params.url(CURRENT_PATH);
        let forecast_url = self.params.url(FORECAST_PATH);
        let query = self.params.coords_query(coords);

        let (current, forecast) = tokio::try_join!(
            self.http.fetch_json(&current_url, &query),
            self.http.fetch_json(&forecast_url, &query)
        )?;

        let current: OwCurrentResponse = current.decode("current weather")?;
        let forecast: OwForecastResponse = forecast.decode("forecast")?;

        let list = forecast.list.unwrap_or_else(|| {
            tracing::warn!("Forecast response has no list, using an empty forecast");
            Vec::new()
        });

        let daily = synthesize_daily(&list, current.timezone.unwrap_or(0));
        let current = normalize_current(current);
        let city_name = match city_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => current.name.clone(),
        };

        Ok(WeatherResult { current, daily, city_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // 2024-01-01T00:00:00Z
    const JAN_1: i64 = 1_704_067_200;
    const THREE_HOURS: i64 = 3 * 3600;
    const DAY: i64 = 24 * 3600;

    fn entry(dt: i64, temp: Option<f64>, icon: &str) -> ForecastEntry {
        ForecastEntry {
            dt: Some(dt),
            main: ForecastMain { temp },
            weather: vec![Condition { icon: icon.into(), description: format!("desc {icon}") }],
        }
    }

    #[test]
    fn single_day_min_max_and_middle_representative() {
        let temps = [0.0, 2.0, 4.0, 6.0, 8.0, 6.0, 4.0, 2.0];
        let entries: Vec<_> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| entry(JAN_1 + i as i64 * THREE_HOURS, Some(*t), &format!("{i:02}d")))
            .collect();

        let daily = synthesize_daily(&entries, 25200);

        assert_eq!(daily.len(), 1);
        let day = &daily[0];
        assert_eq!(day.temp.min, Some(0.0));
        assert_eq!(day.temp.max, Some(8.0));
        assert_eq!(day.temp.day, Some(8.0));
        assert_eq!(day.dt, JAN_1 + 4 * THREE_HOURS);
        assert_eq!(day.weather[0].icon, "04d");
        assert_eq!(day.timezone_offset, 25200);
    }

    #[test]
    fn caps_at_eight_days_and_drops_the_rest() {
        let entries: Vec<_> = (0..10).map(|d| entry(JAN_1 + d * DAY, Some(d as f64), "01d")).collect();

        let daily = synthesize_daily(&entries, 0);

        assert_eq!(daily.len(), 8);
        assert_eq!(daily[7].dt, JAN_1 + 7 * DAY);
        assert_eq!(daily[7].temp.max, Some(7.0));
    }

    #[test]
    fn late_entries_for_known_days_still_join_their_group() {
        let mut entries: Vec<_> = (0..9).map(|d| entry(JAN_1 + d * DAY, Some(1.0), "01d")).collect();
        entries.push(entry(JAN_1 + THREE_HOURS, Some(-5.0), "02d"));

        let daily = synthesize_daily(&entries, 0);

        assert_eq!(daily.len(), 8);
        assert_eq!(daily[0].temp.min, Some(-5.0));
    }

    #[test]
    fn groups_by_utc_date_not_local_date() {
        // 23:00 and 01:00 UTC straddle midnight UTC but share a local day at +07:00.
        let entries = vec![
            entry(JAN_1 - 3600, Some(10.0), "01n"),
            entry(JAN_1 + 3600, Some(12.0), "02n"),
        ];

        let daily = synthesize_daily(&entries, 25200);
        assert_eq!(daily.len(), 2);
    }

    #[test]
    fn days_without_numeric_temps_leave_min_max_unset() {
        let entries = vec![entry(JAN_1, None, "01d"), entry(JAN_1 + THREE_HOURS, None, "02d")];

        let daily = synthesize_daily(&entries, 0);

        assert_eq!(daily[0].temp.min, None);
        assert_eq!(daily[0].temp.max, None);
        assert_eq!(daily[0].temp.day, None);
        assert_eq!(daily[0].weather[0].icon, "02d");
    }

    #[test]
    fn entries_without_temps_are_ignored_for_min_max() {
        let entries = vec![
            entry(JAN_1, Some(3.0), "01d"),
            entry(JAN_1 + THREE_HOURS, None, "02d"),
            entry(JAN_1 + 2 * THREE_HOURS, Some(9.0), "03d"),
        ];

        let daily = synthesize_daily(&entries, 0);

        assert_eq!(daily[0].temp.min, Some(3.0));
        assert_eq!(daily[0].temp.max, Some(9.0));
        assert_eq!(daily[0].temp.day, None);
    }

    #[test]
    fn entries_without_timestamp_are_skipped() {
        let entries = vec![ForecastEntry::default(), entry(JAN_1, Some(1.0), "01d")];
        let daily = synthesize_daily(&entries, 0);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].dt, JAN_1);
    }

    #[test]
    fn empty_list_gives_empty_daily() {
        assert!(synthesize_daily(&[], 0).is_empty());
    }

    #[test]
    fn normalize_keeps_missing_numbers_absent() {
        let resp: OwCurrentResponse = serde_json::from_value(json!({
            "name": "Huế",
            "main": { "temp": 27.0 },
            "weather": [{ "icon": "10d", "description": "mưa nhẹ" }]
        }))
        .unwrap();

        let current = normalize_current(resp);

        assert_eq!(current.name, "Huế");
        assert_eq!(current.temp, Some(27.0));
        assert_eq!(current.humidity, None);
        assert_eq!(current.feels_like, None);
        assert_eq!(current.wind_speed, None);
        assert_eq!(current.timezone_offset, None);
        assert_eq!(current.sunrise, None);
        assert_eq!(current.weather.len(), 1);
    }

    #[test]
    fn normalize_maps_nested_fields() {
        let resp: OwCurrentResponse = serde_json::from_value(json!({
            "name": "Hanoi",
            "main": { "temp": 20.0, "feels_like": 19.5, "humidity": 60 },
            "wind": { "speed": 2.5 },
            "timezone": 25200,
            "sys": { "sunrise": 100, "sunset": 200 },
            "weather": []
        }))
        .unwrap();

        let current = normalize_current(resp);

        assert_eq!(current.humidity, Some(60.0));
        assert_eq!(current.wind_speed, Some(2.5));
        assert_eq!(current.timezone_offset, Some(25200));
        assert_eq!((current.sunrise, current.sunset), (Some(100), Some(200)));
    }
}
