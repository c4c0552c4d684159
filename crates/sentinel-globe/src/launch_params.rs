//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use bevy::prelude::*;
use sentinel_globe::DEFAULT_ROTATION_SPEED;

/// Launch parameters for the viewer.
#[derive(Resource, Debug)]
pub struct LaunchParams {
    /// Category snapshot JSON; the built-in demo set is used when absent.
    pub snapshot: Option<PathBuf>,
    /// Weather snapshot JSON.
    pub weather: Option<PathBuf>,
    /// Auto-rotation in radians per frame.
    pub rotation_speed: f32,
    pub intensity_filter: f32,
    /// Initial focus as `(lat, lon)` in degrees.
    pub focus: Option<(f64, f64)>,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            snapshot: None,
            weather: None,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            intensity_filter: 0.0,
            focus: None,
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    /// Parse a `lat,lon` pair in degrees.
    pub(super) fn parse_focus(s: &str) -> Result<(f64, f64), String> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LON, got '{s}'"))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid latitude: {e}"))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid longitude: {e}"))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude out of range: {lat}"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!("longitude out of range: {lon}"));
        }
        Ok((lat, lon))
    }

    fn parse_filter(s: &str) -> Result<f32, String> {
        let value = s
            .parse::<f32>()
            .map_err(|e| format!("invalid intensity filter: {e}"))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("intensity filter out of range: {value}"));
        }
        Ok(value)
    }

    #[derive(Parser)]
    #[command(about = "Interactive 3D globe of geopolitical and environmental zones")]
    struct CliArgs {
        /// Category snapshot JSON file.
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Weather snapshot JSON file.
        #[arg(long)]
        weather: Option<PathBuf>,

        /// Auto-rotation in radians per frame (0 disables).
        #[arg(long, default_value_t = DEFAULT_ROTATION_SPEED)]
        rotation_speed: f32,

        /// Minimum zone intensity shown (0 to 1).
        #[arg(long, default_value_t = 0.0, value_parser = parse_filter)]
        intensity_filter: f32,

        /// Location to center on at startup (format: LAT,LON).
        #[arg(long, value_parser = parse_focus, allow_hyphen_values = true)]
        focus: Option<(f64, f64)>,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            snapshot: args.snapshot,
            weather: args.weather,
            rotation_speed: args.rotation_speed,
            intensity_filter: args.intensity_filter,
            focus: args.focus,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}

#[cfg(all(test, not(target_family = "wasm")))]
mod tests {
    use super::native::parse_focus;

    #[test]
    fn test_parse_focus() {
        assert_eq!(parse_focus("48.37,31.16"), Ok((48.37, 31.16)));
        assert_eq!(parse_focus("-33.86, 151.2"), Ok((-33.86, 151.2)));
        assert!(parse_focus("48.37").is_err());
        assert!(parse_focus("91,0").is_err());
        assert!(parse_focus("0,abc").is_err());
    }
}
