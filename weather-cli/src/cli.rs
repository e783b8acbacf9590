use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, Select, Text};
use weather_core::{
    Config, Coordinates, ProviderId, StaticLocation, WeatherPayload, WeatherQuery, WeatherService,
    locate,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Print the raw result as JSON instead of the weather card.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log requests and fallback decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, backend proxy and home location.
    Configure,

    /// Show weather for a city name.
    Show {
        /// City or place name, e.g. "Hà Nội".
        city: String,
    },

    /// Show weather for coordinates.
    Coords {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Show weather for the configured home location.
    Here {
        /// Seconds to wait for the location before giving up.
        #[arg(long, default_value_t = 15)]
        timeout: u64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        let query = match self.command {
            Command::Configure => return configure(config),
            Command::Show { city } => {
                let city = city.trim();
                anyhow::ensure!(!city.is_empty(), "City name must not be empty");
                WeatherQuery::City(city.to_string())
            }
            Command::Coords { lat, lon } => WeatherQuery::Coords(Coordinates::new(lat, lon)),
            Command::Here { timeout } => {
                let source = StaticLocation::new(config.home);
                let coords = locate(&source, Some(Duration::from_secs(timeout)))
                    .await
                    .context("Could not determine your location")?;
                tracing::debug!(lat = coords.lat, lon = coords.lon, "Using home location");
                WeatherQuery::Coords(coords)
            }
        };

        // Env overrides apply to lookups only, never to the file `configure` writes.
        let service = WeatherService::new(config.with_env_overrides())?;
        let payload = service.get_weather(&query).await?;

        print_payload(payload, self.json)
    }
}

fn print_payload(payload: WeatherPayload, json: bool) -> anyhow::Result<()> {
    if json {
        let value = payload.to_json().context("Failed to serialize weather result")?;
        let out =
            serde_json::to_string_pretty(&value).context("Failed to serialize weather result")?;
        println!("{out}");
        return Ok(());
    }

    let result = payload.into_result().context("Backend returned an unexpected weather payload")?;
    println!("{}", render::weather_card(&result));

    let forecast = render::forecast_list(&result.daily);
    if !forecast.is_empty() {
        println!();
        println!("{forecast}");
    }

    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key (empty keeps the current one):")
        .without_confirmation()
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let backend = Text::new("Backend proxy URL (empty for direct mode):")
        .with_default(config.backend_url.as_deref().unwrap_or(""))
        .prompt()?;
    config.backend_url = Some(backend.trim().to_string()).filter(|b| !b.is_empty());

    let provider = Select::new("Provider to try first:", ProviderId::all().to_vec()).prompt()?;
    config.set_provider(provider);

    if Confirm::new("Set a home location for `weather here`?").with_default(false).prompt()? {
        let lat = CustomType::<f64>::new("Latitude:").prompt()?;
        let lon = CustomType::<f64>::new("Longitude:").prompt()?;
        config.home = Some(Coordinates::new(lat, lon));
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}
