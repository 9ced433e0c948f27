use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four pollutants tracked in every dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM25", alias = "pm25", alias = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10", alias = "pm10")]
    Pm10,
    #[serde(rename = "O3", alias = "o3")]
    O3,
    #[serde(rename = "NO2", alias = "no2")]
    No2,
}

impl Pollutant {
    /// All pollutants, in dataset column order.
    pub const ALL: [Pollutant; 4] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::No2,
    ];

    /// Position of this pollutant in [`Pollutant::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Pollutant::Pm25 => 0,
            Pollutant::Pm10 => 1,
            Pollutant::O3 => 2,
            Pollutant::No2 => 3,
        }
    }

    /// Known source column names, checked case-insensitively in this order.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Pollutant::Pm25 => &["pm25tmean2", "pm25", "pm2.5", "pm25_mean"],
            Pollutant::Pm10 => &["pm10tmean2", "pm10"],
            Pollutant::O3 => &["o3tmean2", "o3"],
            Pollutant::No2 => &["no2tmean2", "no2"],
        }
    }

    /// Human readable name, e.g. "PM2.5".
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "O3",
            Pollutant::No2 => "NO2",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => "µg/m³",
            Pollutant::O3 => "ppm",
            Pollutant::No2 => "ppb",
        }
    }

    /// Title used on chart panels.
    pub fn chart_title(&self) -> String {
        let name = match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "Ozone",
            Pollutant::No2 => "Nitrogen Dioxide",
        };
        format!("{} ({})", name, self.unit())
    }

    /// Lowercase identifier safe for file names and CSV headers.
    pub fn slug(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
            Pollutant::O3 => "o3",
            Pollutant::No2 => "no2",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Pollutant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pm25" | "pm2.5" => Ok(Pollutant::Pm25),
            "pm10" => Ok(Pollutant::Pm10),
            "o3" => Ok(Pollutant::O3),
            "no2" => Ok(Pollutant::No2),
            other => Err(format!(
                "unknown pollutant '{other}' (expected one of PM25, PM10, O3, NO2)"
            )),
        }
    }
}
