use std::fmt;
use std::time::Duration;

use renderer::{Color, LoaderOptions, Shape};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoaderConfig {
    pub version: u32,
    #[serde(default)]
    pub loader: LoaderSection,
    #[serde(default)]
    pub simulation: SimulationSection,
}

/// Construction options for the favicon loader.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoaderSection {
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub palette: Option<Vec<Color>>,
}

/// Settings for stepping a loader through a simulated job.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSection {
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(
        default = "default_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub interval: Duration,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_icons")]
    pub icons: Vec<String>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            step: default_step(),
            interval: default_interval(),
            title: default_title(),
            icons: default_icons(),
        }
    }
}

fn default_step() -> f64 {
    10.0
}

fn default_interval() -> Duration {
    Duration::from_millis(0)
}

fn default_title() -> String {
    "favload".to_string()
}

fn default_icons() -> Vec<String> {
    vec!["/favicon.ico".to_string()]
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or_else(default_interval))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_duration(v).map(Some).map_err(E::custom)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

/// Parses `"250ms"`, `"1.5s"` or plain seconds (`"2"`).
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds.is_sign_negative() {
            return Err(format!("invalid duration '{raw}': must be non-negative"));
        }
        return Ok(Duration::from_secs_f64(seconds));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{raw}': {err}"))
}

impl LoaderConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: LoaderConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some(max) = self.loader.max {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "loader.max must be greater than zero (got {max})"
                )));
            }
        }

        if let Some(palette) = &self.loader.palette {
            if palette.is_empty() {
                return Err(ConfigError::Invalid(
                    "loader.palette must contain at least one color".into(),
                ));
            }
        }

        let step = self.simulation.step;
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "simulation.step must be greater than zero (got {step})"
            )));
        }

        for icon in &self.simulation.icons {
            if icon.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "simulation.icons contains an empty href".into(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            version: 1,
            loader: LoaderSection::default(),
            simulation: SimulationSection::default(),
        }
    }
}

impl LoaderSection {
    /// Options with every unset field left to the renderer defaults.
    pub fn to_options(&self) -> LoaderOptions {
        LoaderOptions {
            shape: self.shape.unwrap_or_default(),
            message: self.message.clone(),
            max: self.max,
            palette: self.palette.clone(),
        }
    }
}
