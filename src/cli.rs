use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use crate::geolocate::GEO_URL;
use crate::units::Units;
use crate::weatherapi::BASE_URL;

const ABOUT: &str = "Current weather TUI";

const LONG_ABOUT: &str = "
TUI for viewing current weather conditions sourced from WeatherAPI.com.

On start the approximate position of this machine is looked up and the conditions there are shown.
Type a place name and press Enter to look somewhere else. Pass a PLACE to skip the position lookup,
or --lat/--lon to use a known position.

An API key from https://www.weatherapi.com is required, either through --api-key or the
WEATHER_API_KEY environment variable.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "Place to show instead of the current position (e.g. Paris, 10001, \"48.85,2.35\")")]
    pub place: Option<String>,

    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true, help = "WeatherAPI.com API key")]
    pub api_key: Option<String>,

    #[arg(long, env = "WEATHER_API_URL", default_value = BASE_URL, help = "Weather API base URL")]
    pub api_url: String,

    #[arg(long, env = "WXNOW_GEO_URL", default_value = GEO_URL, help = "IP geolocation endpoint")]
    pub geo_url: String,

    #[arg(long, requires = "lon", allow_negative_numbers = true, help = "Latitude of a fixed position")]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true, help = "Longitude of a fixed position")]
    pub lon: Option<f64>,

    #[arg(long, conflicts_with_all = ["lat", "lon"], help = "Start without looking up the position")]
    pub no_locate: bool,

    #[arg(long, value_enum, default_value_t = Units::Metric, help = "Units to display")]
    pub units: Units,

    #[arg(long, default_value_t = 10, help = "Request timeout in seconds")]
    pub timeout: u64,

    #[arg(long, help = "Write logs to this file (filter with RUST_LOG)")]
    pub log_file: Option<PathBuf>,
}
