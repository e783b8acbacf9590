use std::fmt::Write as _;

use chrono::DateTime;
use weather_core::{DailyForecastEntry, DailyTemp, WeatherResult};

const MISSING: &str = "—";
const FORECAST_DAYS: usize = 7;

pub fn format_temp(t: Option<f64>) -> String {
    t.map(|v| format!("{}°C", v.round())).unwrap_or_else(|| MISSING.to_string())
}

fn format_percent(v: Option<f64>) -> String {
    v.map(|v| format!("{v}%")).unwrap_or_else(|| MISSING.to_string())
}

fn format_wind(w: Option<f64>) -> String {
    w.map(|v| format!("{v} m/s")).unwrap_or_else(|| MISSING.to_string())
}

/// Local wall-clock `HH:MM` for a UTC timestamp shifted by `offset` seconds.
pub fn format_clock(ts: i64, offset: i64) -> String {
    DateTime::from_timestamp(ts + offset, 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

pub fn day_label(dt: i64, offset: i64) -> String {
    DateTime::from_timestamp(dt + offset, 0)
        .map(|t| t.format("%a %d %b").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// High shown for a day: max, else the day temperature, else min.
fn high(temp: &DailyTemp) -> Option<f64> {
    temp.max.or(temp.day).or(temp.min)
}

fn short_temp(t: Option<f64>) -> String {
    t.map(|v| format!("{}°", v.round())).unwrap_or_else(|| MISSING.to_string())
}

pub fn weather_card(result: &WeatherResult) -> String {
    let current = &result.current;
    let name = Some(result.display_name()).filter(|n| !n.is_empty()).unwrap_or(MISSING);
    let description = current.primary_condition().map(|c| c.description.as_str()).unwrap_or("");

    let mut out = String::new();
    let _ = writeln!(out, "{name}");
    let _ = writeln!(out, "{}  {description}", format_temp(current.temp));
    let _ = writeln!(out, "Feels: {}", format_temp(current.feels_like));
    let _ = writeln!(out, "Humidity: {}", format_percent(current.humidity));
    let _ = write!(out, "Wind: {}", format_wind(current.wind_speed));

    if let (Some(sunrise), Some(sunset)) = (current.sunrise, current.sunset) {
        let offset = current.timezone_offset.unwrap_or(0);
        let _ = write!(
            out,
            "\nSunrise: {}  Sunset: {}",
            format_clock(sunrise, offset),
            format_clock(sunset, offset)
        );
    }

    out
}

pub fn forecast_list(daily: &[DailyForecastEntry]) -> String {
    daily
        .iter()
        .take(FORECAST_DAYS)
        .map(|d| {
            let description = d.weather.first().map(|w| w.description.as_str()).unwrap_or("");
            format!(
                "{:<12} {:>4} {:>4}  {description}",
                day_label(d.dt, d.timezone_offset),
                short_temp(high(&d.temp)),
                short_temp(d.temp.min),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{Condition, CurrentConditions};

    // 2024-01-01T00:00:00Z, a Monday
    const JAN_1: i64 = 1_704_067_200;

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(format_temp(None), "—");
        assert_eq!(format_percent(None), "—");
        assert_eq!(format_wind(None), "—");
    }

    #[test]
    fn temperatures_are_rounded() {
        assert_eq!(format_temp(Some(23.6)), "24°C");
        assert_eq!(short_temp(Some(7.2)), "7°");
    }

    #[test]
    fn clock_applies_timezone_offset() {
        assert_eq!(format_clock(JAN_1, 0), "00:00");
        assert_eq!(format_clock(JAN_1, 7 * 3600), "07:00");
    }

    #[test]
    fn day_label_uses_local_date() {
        assert_eq!(day_label(JAN_1, 0), "Mon 01 Jan");
        assert_eq!(day_label(JAN_1 - 3600, 7 * 3600), "Mon 01 Jan");
    }

    #[test]
    fn high_prefers_max_then_day_then_min() {
        let mut temp = DailyTemp { min: Some(1.0), ..Default::default() };
        assert_eq!(high(&temp), Some(1.0));
        temp.day = Some(5.0);
        assert_eq!(high(&temp), Some(5.0));
        temp.max = Some(9.0);
        assert_eq!(high(&temp), Some(9.0));
    }

    #[test]
    fn card_shows_sun_times_only_when_both_present() {
        let mut result = WeatherResult {
            city_name: "Hanoi, VN".into(),
            current: CurrentConditions {
                temp: Some(24.0),
                sunrise: Some(JAN_1 - 3600),
                timezone_offset: Some(25200),
                weather: vec![Condition { icon: "01d".into(), description: "trời quang".into() }],
                ..Default::default()
            },
            daily: Vec::new(),
        };

        let card = weather_card(&result);
        assert!(card.starts_with("Hanoi, VN\n24°C  trời quang"));
        assert!(card.contains("Humidity: —"));
        assert!(!card.contains("Sunrise"));

        result.current.sunset = Some(JAN_1 + 36000);
        assert!(weather_card(&result).contains("Sunrise: 06:00  Sunset: 17:00"));
    }

    #[test]
    fn forecast_list_shows_at_most_seven_days() {
        let daily: Vec<_> = (0..8)
            .map(|i| DailyForecastEntry { dt: JAN_1 + i * 86_400, ..Default::default() })
            .collect();

        assert_eq!(forecast_list(&daily).lines().count(), 7);
        assert_eq!(forecast_list(&[]), "");
    }
}
