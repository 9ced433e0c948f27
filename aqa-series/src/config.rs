//! Run configuration.
//!
//! Values are layered: [`AnalysisConfig::default`], then an optional JSON file,
//! then command line overrides applied by the caller. The config, including
//! the chart [`Palette`], is passed explicitly to every stage that needs it.

use crate::{error::ConfigError, pollutant::Pollutant};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, path::PathBuf, str::FromStr};

/// Sampling frequency fed to the seasonal decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionFrequency {
    /// Gap-filled daily values, annual period of 365 days
    Daily,
    /// Monthly means of the gap-filled values, period of 12 months
    Monthly,
}

impl DecompositionFrequency {
    /// Seasonal period matching this sampling frequency.
    pub fn period(&self) -> usize {
        match self {
            DecompositionFrequency::Daily => 365,
            DecompositionFrequency::Monthly => 12,
        }
    }
}

impl fmt::Display for DecompositionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompositionFrequency::Daily => write!(f, "daily"),
            DecompositionFrequency::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for DecompositionFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(DecompositionFrequency::Daily),
            "monthly" | "m" => Ok(DecompositionFrequency::Monthly),
            other => Err(format!(
                "unknown frequency '{other}' (expected daily or monthly)"
            )),
        }
    }
}

/// RGB triple.
pub type Rgb = [u8; 3];

/// Chart colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    /// Line colors in [`Pollutant::ALL`] order
    pub pollutants: [Rgb; 4],
    /// Darker shades used for trend lines, same order
    pub dark: [Rgb; 4],
    pub background: Rgb,
    pub text: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            // #E63946, #457B9D, #FCA311, #588157
            pollutants: [[230, 57, 70], [69, 123, 157], [252, 163, 17], [88, 129, 87]],
            // #A62633, #315B79, #C5820E, #406545
            dark: [[166, 38, 51], [49, 91, 121], [197, 130, 14], [64, 101, 69]],
            // #F8F9FA
            background: [248, 249, 250],
            // #343A40
            text: [52, 58, 64],
        }
    }
}

impl Palette {
    pub fn color(&self, pollutant: Pollutant) -> Rgb {
        self.pollutants[pollutant.index()]
    }

    pub fn dark(&self, pollutant: Pollutant) -> Rgb {
        self.dark[pollutant.index()]
    }
}

/// Default number of peak days reported per pollutant.
pub const DEFAULT_PEAK_COUNT: usize = 5;

/// Default significance level of the trend test.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Every option recognised by an analysis run. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Longest run of missing days that gets interpolated
    pub gap_fill_limit_days: usize,
    pub peak_count: usize,
    pub decomposition_pollutant: Pollutant,
    pub decomposition_frequency: DecompositionFrequency,
    pub trend_test_pollutant: Pollutant,
    /// Pollutant shown in the monthly box plot
    pub distribution_pollutant: Pollutant,
    pub rolling_window_days: usize,
    pub rolling_min_periods: usize,
    /// Pollutants whose column must exist in the source. `None` means the
    /// trend and decomposition pollutants.
    pub required_pollutants: Option<Vec<Pollutant>>,
    pub significance_level: f64,
    pub output_directory: PathBuf,
    pub palette: Palette,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            start_year: 2000,
            end_year: 2002,
            gap_fill_limit_days: 7,
            peak_count: DEFAULT_PEAK_COUNT,
            decomposition_pollutant: Pollutant::Pm25,
            decomposition_frequency: DecompositionFrequency::Daily,
            trend_test_pollutant: Pollutant::Pm25,
            distribution_pollutant: Pollutant::Pm25,
            rolling_window_days: 30,
            rolling_min_periods: 10,
            required_pollutants: None,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            output_directory: PathBuf::from("output"),
            palette: Palette::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a JSON config; absent keys keep their defaults.
    ///
    /// The result is not validated, since later layers may still change it.
    /// Call [`AnalysisConfig::validate`] once every layer is applied.
    pub fn from_json_str(json: &str) -> Result<AnalysisConfig, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<AnalysisConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        AnalysisConfig::from_json_str(&contents)
    }

    /// Seasonal period implied by the decomposition frequency.
    pub fn decomposition_period(&self) -> usize {
        self.decomposition_frequency.period()
    }

    /// Pollutants whose absence from the source is fatal.
    pub fn required_pollutants(&self) -> Vec<Pollutant> {
        match &self.required_pollutants {
            Some(list) => list.clone(),
            None => {
                let mut list = vec![self.trend_test_pollutant];
                if self.decomposition_pollutant != self.trend_test_pollutant {
                    list.push(self.decomposition_pollutant);
                }
                list
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_year > self.end_year {
            return Err(ConfigError::InvalidYearRange {
                start_year: self.start_year,
                end_year: self.end_year,
            });
        }
        if self.rolling_window_days == 0 {
            return Err(ConfigError::InvalidValue {
                option: "rolling_window_days",
                reason: String::from("must be at least 1"),
            });
        }
        if self.rolling_min_periods > self.rolling_window_days {
            return Err(ConfigError::InvalidValue {
                option: "rolling_min_periods",
                reason: format!(
                    "{} exceeds the window of {} days",
                    self.rolling_min_periods, self.rolling_window_days
                ),
            });
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(ConfigError::InvalidValue {
                option: "significance_level",
                reason: format!("{} is not in (0, 1)", self.significance_level),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AnalysisConfig, DecompositionFrequency, DEFAULT_PEAK_COUNT, DEFAULT_SIGNIFICANCE_LEVEL,
    };
    use crate::{error::ConfigError, pollutant::Pollutant};

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.gap_fill_limit_days, 7);
        assert_eq!(config.peak_count, DEFAULT_PEAK_COUNT);
        assert_eq!(config.significance_level, DEFAULT_SIGNIFICANCE_LEVEL);
        assert_eq!(config.decomposition_pollutant, Pollutant::Pm25);
        assert_eq!(config.trend_test_pollutant, Pollutant::Pm25);
        assert_eq!(config.decomposition_period(), 365);
        assert_eq!(config.required_pollutants(), vec![Pollutant::Pm25]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json_str(
            r#"{ "start_year": 2001, "decomposition_frequency": "monthly", "trend_test_pollutant": "O3" }"#,
        )
        .unwrap();
        assert_eq!(config.start_year, 2001);
        assert_eq!(config.end_year, 2002);
        assert_eq!(config.decomposition_period(), 12);
        assert_eq!(
            config.required_pollutants(),
            vec![Pollutant::O3, Pollutant::Pm25]
        );
    }

    #[test]
    fn test_invalid_year_range_rejected() {
        let config =
            AnalysisConfig::from_json_str(r#"{ "start_year": 2003, "end_year": 2002 }"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidYearRange { .. })
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = AnalysisConfig::from_json_str(r#"{ "gap_fill_limit": 3 }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));

        let palette = AnalysisConfig::from_json_str(r#"{ "palette": { "backgroud": [0, 0, 0] } }"#);
        assert!(matches!(palette, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_invalid_rolling_window_rejected() {
        let config = AnalysisConfig {
            rolling_window_days: 5,
            rolling_min_periods: 10,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                option: "rolling_min_periods",
                ..
            })
        ));
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Monthly".parse::<DecompositionFrequency>(), Ok(DecompositionFrequency::Monthly));
        assert_eq!("d".parse::<DecompositionFrequency>(), Ok(DecompositionFrequency::Daily));
        assert!("weekly".parse::<DecompositionFrequency>().is_err());
    }
}
