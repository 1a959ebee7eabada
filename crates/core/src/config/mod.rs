use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    testing::DEFAULT_TEST_DURATION_SEC,
    timeline::{BuiltinTimeline, Timeline},
    Result,
};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ticker: TickerConfig,
    pub timeline: TimelineSource,
    pub testing: TestingConfig,
    pub validation: ValidationMode,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Loads the configured timeline and applies the validation policy.
    pub fn load_timeline(&self) -> Result<Timeline> {
        let timeline = self.timeline.load()?;
        match self.validation {
            ValidationMode::Off => Ok(timeline),
            ValidationMode::Warn => {
                for issue in timeline.validate() {
                    tracing::warn!(%issue, "timeline validation");
                }
                Ok(timeline)
            }
            ValidationMode::Strict => timeline.validated(),
        }
    }
}

/// Settings for the periodic driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub fps: u32,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self { fps: 10 }
    }
}

/// Where the timeline asset comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSource {
    Builtin(BuiltinTimeline),
    Path(PathBuf),
}

impl Default for TimelineSource {
    fn default() -> Self {
        Self::Builtin(BuiltinTimeline::default())
    }
}

impl TimelineSource {
    pub fn load(&self) -> Result<Timeline> {
        match self {
            Self::Builtin(which) => Timeline::builtin(*which),
            Self::Path(path) => Timeline::load(path),
        }
    }
}

/// Settings for the event testing override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingConfig {
    pub default_duration_sec: f64,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            default_duration_sec: DEFAULT_TEST_DURATION_SEC,
        }
    }
}

/// What to do with timeline validation findings on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    Off,
    #[default]
    Warn,
    Strict,
}
