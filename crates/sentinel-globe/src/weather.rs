//! Weather telemetry points and WMO condition classification.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Current conditions at one location, as reported by the weather service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPoint {
    pub lat: f64,
    pub lon: f64,
    /// Temperature in degrees Celsius.
    pub temp: f32,
    /// WMO weather interpretation code.
    pub condition_code: u16,
    /// Precipitation in millimeters.
    #[serde(default)]
    pub precipitation: f32,
    /// Wind speed in meters per second.
    #[serde(default)]
    pub wind_speed: f32,
    /// Wind direction in degrees.
    #[serde(default)]
    pub wind_direction: f32,
    /// True for major reference cities, false for points sampled at zones.
    #[serde(default)]
    pub is_reference: bool,
}

impl WeatherPoint {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.condition_code)
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::invalid(
                "weather point",
                format!("position ({}, {}) out of range", self.lat, self.lon),
            ));
        }
        if !self.temp.is_finite() || !self.wind_direction.is_finite() {
            return Err(Error::invalid("weather point", "non-finite reading"));
        }
        Ok(())
    }
}

/// Coarse condition classes used to pick a glyph sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Showers,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    /// Every condition, in glyph atlas order.
    pub const ALL: [WeatherCondition; 9] = [
        WeatherCondition::Clear,
        WeatherCondition::PartlyCloudy,
        WeatherCondition::Fog,
        WeatherCondition::Drizzle,
        WeatherCondition::Rain,
        WeatherCondition::Snow,
        WeatherCondition::Showers,
        WeatherCondition::Thunderstorm,
        WeatherCondition::Unknown,
    ];

    /// Classify a WMO weather interpretation code.
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1..=3 => WeatherCondition::PartlyCloudy,
            45 | 48 => WeatherCondition::Fog,
            51..=55 => WeatherCondition::Drizzle,
            61..=65 => WeatherCondition::Rain,
            71..=77 => WeatherCondition::Snow,
            80..=82 => WeatherCondition::Showers,
            95..=u16::MAX => WeatherCondition::Thunderstorm,
            _ => WeatherCondition::Unknown,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear Sky",
            WeatherCondition::PartlyCloudy => "Partly Cloudy",
            WeatherCondition::Fog => "Fog",
            WeatherCondition::Drizzle => "Drizzle",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Showers => "Showers",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::Unknown => "Unknown",
        }
    }
}
