//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Forward/reverse geocoding of locations
//! - Two OpenWeather providers (one-call and split endpoints) and the
//!   fallback from one to the other
//! - The service facade used by presentation code
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod geocode;
pub mod http;
pub mod location;
pub mod model;
pub mod provider;
pub mod service;

pub use config::Config;
pub use error::WeatherError;
pub use geocode::{LocationResolver, ResolvedLocation};
pub use http::{Body, HttpFetcher};
pub use location::{LocationSource, StaticLocation, locate};
pub use model::{
    Condition, Coordinates, CurrentConditions, DailyForecastEntry, DailyTemp, WeatherQuery,
    WeatherResult,
};
pub use provider::{ProviderId, WeatherProvider};
pub use service::{WeatherPayload, WeatherService};
