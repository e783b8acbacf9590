use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One condition entry as reported by OpenWeather (`weather[]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

/// Normalized current conditions.
///
/// Numeric fields are `None` when the upstream response lacks them; they are
/// never coerced to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone_offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    /// Remaining fields of the one-call `current` block (pressure, uvi, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CurrentConditions {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTemp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub dt: i64,
    #[serde(default)]
    pub temp: DailyTemp,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub timezone_offset: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The uniform result of every fetch path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub current: CurrentConditions,
    #[serde(default)]
    pub daily: Vec<DailyForecastEntry>,
    /// Empty only when the location could not be named.
    #[serde(rename = "cityName", default)]
    pub city_name: String,
}

impl WeatherResult {
    /// Name to display: the resolved city name, else the provider's own name.
    pub fn display_name(&self) -> &str {
        if self.city_name.is_empty() { &self.current.name } else { &self.city_name }
    }
}

/// What a caller asks the service for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coords(Coordinates),
}
