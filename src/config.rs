//! Counter configuration: fences and track retirement, loaded from TOML.
//!
//! ```toml
//! retire_after_frames = 300
//!
//! [[fence]]
//! from = [100, 400]
//! to = [900, 400]
//! ```
//!
//! Resolution order is file, then environment, then validation.

use std::path::Path;

use serde::Deserialize;

use crate::crossing::{CrossingEngine, EngineConfig, MAX_FENCES, Point};
use crate::error::{ConfigError, FenceError};
use crate::integration::FenceBuilder;

/// Overrides `retire_after_frames`; `0` or `off` disables retirement.
pub const ENV_RETIRE_AFTER: &str = "FENCE_COUNTER_RETIRE_AFTER";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CounterConfigFile {
    retire_after_frames: Option<u64>,
    #[serde(default, rename = "fence")]
    fences: Vec<FenceConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FenceConfigFile {
    from: [i64; 2],
    to: [i64; 2],
}

/// Fence endpoints in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceLine {
    pub from: [i64; 2],
    pub to: [i64; 2],
}

impl FenceLine {
    pub fn new(from: [i64; 2], to: [i64; 2]) -> Self {
        Self { from, to }
    }

    fn points(&self) -> (Point, Point) {
        (
            Point::new(self.from[0] as f64, self.from[1] as f64),
            Point::new(self.to[0] as f64, self.to[1] as f64),
        )
    }
}

impl std::str::FromStr for FenceLine {
    type Err = String;

    /// Parses `x1,y1,x2,y2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coords = s
            .split(',')
            .map(|c| c.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid fence {:?}: {}", s, e))?;
        match coords.as_slice() {
            [x1, y1, x2, y2] => Ok(Self::new([*x1, *y1], [*x2, *y2])),
            _ => Err(format!("invalid fence {:?}: expected x1,y1,x2,y2", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterConfig {
    pub fences: Vec<FenceLine>,
    pub engine: EngineConfig,
}

impl CounterConfig {
    /// Load from a TOML file, then apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::from_toml_str(&raw)?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse TOML without environment overrides or validation.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: CounterConfigFile = toml::from_str(raw)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: CounterConfigFile) -> Self {
        Self {
            fences: file
                .fences
                .into_iter()
                .map(|f| FenceLine::new(f.from, f.to))
                .collect(),
            engine: EngineConfig {
                retire_after_frames: file.retire_after_frames,
            },
        }
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` in place of the process environment.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_RETIRE_AFTER) {
            let value = value.trim();
            if value.is_empty() {
                return Ok(());
            }
            self.engine.retire_after_frames = match value {
                "0" | "off" | "none" => None,
                _ => Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_RETIRE_AFTER,
                    value: value.to_string(),
                })?),
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fences.len() > MAX_FENCES {
            return Err(FenceError::too_many(self.fences.len()).into());
        }
        if self.engine.retire_after_frames == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "retire_after_frames",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn fence_builder(&self) -> FenceBuilder {
        self.fences.iter().fold(FenceBuilder::new(), |builder, line| {
            let (from, to) = line.points();
            builder.points(from, to)
        })
    }

    /// Build a ready-to-run engine from this configuration.
    pub fn build_engine(&self) -> Result<CrossingEngine, ConfigError> {
        self.validate()?;
        let registry = self.fence_builder().build()?;
        Ok(CrossingEngine::new(registry, self.engine.clone()))
    }
}
