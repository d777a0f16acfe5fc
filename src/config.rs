use serde::{Deserialize, Serialize};
use shakmaty::Color;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use crate::logic::{RulesEngine, RulesError, ShakmatyRules};

pub const DEFAULT_PATH: &str = "gate_config.json";

/// Highest skill rating the selector understands.
pub const MAX_SKILL: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub version: String,
    pub engine: EngineConfig,
    pub clock: ClockConfig,
    pub timing: TimingConfig,
    pub player_color: PlayerColor,
    /// Position to start from instead of the standard setup.
    pub start_fen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub depth: u8,
    pub skill: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub budget_secs: u32,
}

/// Every delay the session schedules, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub think_min_ms: u64,
    pub think_max_ms: u64,
    pub progress_interval_ms: u64,
    pub tick_ms: u64,
    pub settle_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    #[default]
    White,
    Black,
}

impl PlayerColor {
    pub fn color(self) -> Color {
        match self {
            PlayerColor::White => Color::White,
            PlayerColor::Black => Color::Black,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }
}

impl From<Color> for PlayerColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => PlayerColor::White,
            Color::Black => PlayerColor::Black,
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlayerColor::White => write!(f, "white"),
            PlayerColor::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("search depth must be at least 1")]
    ZeroDepth,

    #[error("skill {0} is outside 0..=3000")]
    SkillOutOfRange(u16),

    #[error("clock budget must be at least one second")]
    ZeroBudget,

    #[error("thinking delay range {min}..={max} ms is empty")]
    ThinkRange { min: u64, max: u64 },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error(transparent)]
    StartPosition(#[from] RulesError),
}

impl GameConfig {
    /// Reads, parses and validates the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(path.as_ref())?;
        let config: GameConfig = serde_json::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`GameConfig::load`], falling back to defaults when the file is
    /// missing or unusable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), error = %e, "bad config, using defaults");
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                }
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.engine.skill > MAX_SKILL {
            return Err(ConfigError::SkillOutOfRange(self.engine.skill));
        }
        if self.clock.budget_secs == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        let t = &self.timing;
        if t.think_min_ms > t.think_max_ms {
            return Err(ConfigError::ThinkRange {
                min: t.think_min_ms,
                max: t.think_max_ms,
            });
        }
        if t.progress_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("progress_interval_ms"));
        }
        if t.tick_ms == 0 {
            return Err(ConfigError::ZeroInterval("tick_ms"));
        }
        if let Some(fen) = &self.start_fen {
            ShakmatyRules::new().load(fen)?;
        }
        Ok(())
    }
}

impl TimingConfig {
    pub fn think_range(&self) -> RangeInclusive<u64> {
        self.think_min_ms..=self.think_max_ms
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            version: "1.0".to_string(),
            engine: EngineConfig::default(),
            clock: ClockConfig::default(),
            timing: TimingConfig::default(),
            player_color: PlayerColor::White,
            start_fen: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            depth: 3,
            skill: 1000,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig { budget_secs: 600 }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            think_min_ms: 1000,
            think_max_ms: 2500,
            progress_interval_ms: 100,
            tick_ms: 1000,
            settle_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.depth, 3);
        assert_eq!(config.clock.budget_secs, 600);
        assert_eq!(config.timing.think_range(), 1000..=2500);
        assert_eq!(config.player_color.color(), Color::White);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "engine": { "skill": 2400 }, "player_color": "black" }"#;
        let config: GameConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.engine,
            EngineConfig {
                depth: 3,
                skill: 2400
            }
        );
        assert_eq!(config.player_color, PlayerColor::Black);
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = GameConfig::default();
        config.engine.depth = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDepth)));

        let mut config = GameConfig::default();
        config.engine.skill = 3001;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SkillOutOfRange(3001))
        ));

        let mut config = GameConfig::default();
        config.timing.think_min_ms = 3000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThinkRange { .. })
        ));

        let mut config = GameConfig::default();
        config.start_fen = Some("garbage".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StartPosition(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("gate_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "clock": { "budget_secs": 60 } }"#).unwrap();
        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.clock.budget_secs, 60);

        std::fs::write(&path, r#"{ "clock": { "budget_secs": 0 } }"#).unwrap();
        assert!(GameConfig::load(&path).is_err());
        assert_eq!(GameConfig::load_or_default(&path), GameConfig::default());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = GameConfig::load_or_default("/nonexistent/gate_config.json");
        assert_eq!(config, GameConfig::default());
    }
}
