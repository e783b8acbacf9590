use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{model::Coordinates, provider::ProviderId};

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";
pub const DEFAULT_UNITS: &str = "metric";
pub const DEFAULT_LANG: &str = "vi";

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const BACKEND_URL_ENV: &str = "WEATHER_BACKEND_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// backend_url = "http://localhost:8080"
/// provider = "split"
///
/// [home]
/// lat = 21.0285
/// lon = 105.8542
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// OpenWeather API key. Required for every direct (non-proxy) request.
    pub api_key: Option<String>,

    /// Base URL of a backend proxy. When set, requests go there instead of
    /// OpenWeather and the key is not needed.
    pub backend_url: Option<String>,

    /// Optional provider pin, "onecall" or "split".
    pub provider: Option<String>,

    pub api_base: Option<String>,
    pub units: Option<String>,
    pub lang: Option<String>,

    /// Coordinates reported as the device location.
    pub home: Option<Coordinates>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `OPENWEATHER_API_KEY` / `WEATHER_BACKEND_URL` on top of the file values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(BACKEND_URL_ENV).ok(),
        )
    }

    pub fn with_overrides(mut self, api_key: Option<String>, backend_url: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = Some(url);
        }
        self
    }

    /// Returns the API key, treating an empty string as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Proxy base URL without a trailing slash; `None` means direct mode.
    pub fn backend_url(&self) -> Option<&str> {
        self.backend_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().map(|u| u.trim_end_matches('/')).unwrap_or(DEFAULT_API_BASE)
    }

    pub fn units(&self) -> &str {
        self.units.as_deref().unwrap_or(DEFAULT_UNITS)
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    /// Provider used first for direct requests. Defaults to one-call.
    pub fn provider_id(&self) -> Result<ProviderId> {
        match self.provider.as_deref() {
            None => Ok(ProviderId::OneCall),
            Some(s) => ProviderId::try_from(s),
        }
    }

    pub fn set_provider(&mut self, id: ProviderId) {
        self.provider = Some(id.as_str().to_string());
    }

    /// Key suitable for logs: first and last two characters only.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key().map(|raw| {
            let chars: Vec<char> = raw.chars().collect();
            if chars.len() > 4 {
                let head: String = chars[..2].iter().collect();
                let tail: String = chars[chars.len() - 2..].iter().collect();
                format!("{head}...{tail}")
            } else {
                "***".to_string()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_configured() {
        let cfg = Config::default();

        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.backend_url(), None);
        assert_eq!(cfg.api_base(), DEFAULT_API_BASE);
        assert_eq!(cfg.units(), "metric");
        assert_eq!(cfg.lang(), "vi");
        assert_eq!(cfg.provider_id().unwrap(), ProviderId::OneCall);
    }

    #[test]
    fn empty_strings_are_treated_as_absent() {
        let cfg = Config {
            api_key: Some("   ".into()),
            backend_url: Some("".into()),
            ..Default::default()
        };

        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.backend_url(), None);
    }

    #[test]
    fn backend_url_trailing_slash_is_stripped() {
        let cfg = Config { backend_url: Some("http://localhost:8080/".into()), ..Default::default() };
        assert_eq!(cfg.backend_url(), Some("http://localhost:8080"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let cfg = Config { api_key: Some("FILE".into()), ..Default::default() }
            .with_overrides(Some("ENV".into()), None);

        assert_eq!(cfg.api_key(), Some("ENV"));
        assert_eq!(cfg.backend_url(), None);
    }

    #[test]
    fn empty_overrides_do_not_clear_file_values() {
        let cfg = Config { api_key: Some("FILE".into()), ..Default::default() }
            .with_overrides(Some(String::new()), Some(" ".into()));

        assert_eq!(cfg.api_key(), Some("FILE"));
        assert_eq!(cfg.backend_url(), None);
    }

    #[test]
    fn provider_pin_is_parsed() {
        let mut cfg = Config::default();
        cfg.set_provider(ProviderId::Split);
        assert_eq!(cfg.provider_id().unwrap(), ProviderId::Split);

        cfg.provider = Some("bogus".into());
        assert!(cfg.provider_id().is_err());
    }

    #[test]
    fn masked_key_hides_the_middle() {
        let cfg = Config { api_key: Some("abcdef123456".into()), ..Default::default() };
        assert_eq!(cfg.masked_api_key().as_deref(), Some("ab...56"));

        let short = Config { api_key: Some("abc".into()), ..Default::default() };
        assert_eq!(short.masked_api_key().as_deref(), Some("***"));
    }

    #[test]
    fn save_and_load_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            backend_url: Some("http://proxy".into()),
            home: Some(Coordinates::new(21.03, 105.85)),
            ..Default::default()
        };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
