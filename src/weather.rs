use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

const LOCALTIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One complete answer of the current-conditions endpoint.
///
/// A snapshot always arrives as a whole document and replaces the previous
/// one; nothing is merged.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: String,
    pub localtime_epoch: i64,
    pub localtime: String,
}

impl Location {
    /// Wall-clock time at the location, as reported by the API. Falls back
    /// to the epoch (in UTC) when the text form is malformed.
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.localtime, LOCALTIME_FORMAT)
            .ok()
            .or_else(|| DateTime::from_timestamp(self.localtime_epoch, 0).map(|t| t.naive_utc()))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub humidity: u8,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    #[serde(default)]
    pub code: Option<u32>,
}

impl Condition {
    /// Icon URL with an explicit scheme. The API hands out `//cdn...` links.
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        }
    }

    /// Icon number and day flag, e.g. `(113, true)` for `.../day/113.png`.
    fn icon_parts(&self) -> Option<(u32, bool)> {
        let mut segments = self.icon.rsplit('/');
        let file = segments.next()?;
        let is_day = segments.next() != Some("night");
        let number = file.strip_suffix(".png")?.parse().ok()?;
        Some((number, is_day))
    }

    pub fn kind(&self) -> ConditionKind {
        match (self.icon_parts(), self.code) {
            (Some((number, _)), _) => ConditionKind::from_icon(number),
            (None, Some(1000)) => ConditionKind::Clear,
            (None, _) => ConditionKind::Cloudy,
        }
    }

    pub fn is_day(&self) -> bool {
        self.icon_parts().map_or(true, |(_, day)| day)
    }

    pub fn glyph(&self) -> &'static str {
        self.kind().glyph(self.is_day())
    }
}

/// Coarse classification of the API's icon set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Rain,
    Sleet,
    Snow,
    Thunder,
}

impl ConditionKind {
    /// See: https://www.weatherapi.com/docs/weather_conditions.json
    pub fn from_icon(number: u32) -> Self {
        match number {
            113 => Self::Clear,
            116 => Self::PartlyCloudy,
            119 | 122 => Self::Cloudy,
            143 | 248 | 260 => Self::Fog,
            176 | 263 | 266 | 281 | 284 | 293 | 296 | 299 | 302 | 305 | 308 | 311 | 314
            | 353 | 356 | 359 => Self::Rain,
            182 | 185 | 317 | 320 | 350 | 362 | 365 | 374 | 377 => Self::Sleet,
            179 | 227 | 230 | 323 | 326 | 329 | 332 | 335 | 338 | 368 | 371 => Self::Snow,
            200 | 386 | 389 | 392 | 395 => Self::Thunder,
            _ => Self::Cloudy,
        }
    }

    pub fn glyph(&self, is_day: bool) -> &'static str {
        match self {
            Self::Clear if is_day => "☀",
            Self::Clear => "☾",
            Self::PartlyCloudy => "⛅",
            Self::Cloudy => "☁",
            Self::Fog => "≡",
            Self::Rain => "☂",
            Self::Sleet => "☔",
            Self::Snow => "❄",
            Self::Thunder => "⚡",
        }
    }
}
