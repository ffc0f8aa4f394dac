use clap::ValueEnum;

use crate::weather::CurrentConditions;

/// Which of the API's paired fields to show. Both come in every answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn toggle(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub fn temperature(self, current: &CurrentConditions) -> String {
        match self {
            Units::Metric => format!("{:.1}°C", current.temp_c),
            Units::Imperial => format!("{:.1}°F", current.temp_f),
        }
    }

    pub fn wind(self, current: &CurrentConditions) -> String {
        match self {
            Units::Metric => format!("{:.1} km/h", current.wind_kph),
            Units::Imperial => format!("{:.1} mph", current.wind_mph),
        }
    }
}
