// File: src/config.rs
//
// Host configuration loaded from a TOML file.
//
//   [viewport]
//   width = 1024
//   height = 768
//
//   [start]        # optional, defaults to the viewport centre
//   x = 512
//   y = 384
//   angle = 0
//
//   [log]
//   filter = "info"

use crate::vm::{FixedViewport, Pose};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub viewport: ViewportSection,
    /// Absent means "centre of the viewport, heading up"
    pub start: Option<StartSection>,
    pub log: LogSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportSection {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportSection {
    fn default() -> Self {
        ViewportSection { width: 1024.0, height: 768.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct StartSection {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        LogSection { filter: "info".to_string() }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid config {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid config {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        Self::from_str(&content, path)
    }

    /// Parse config text; `path` is only used in error messages
    pub fn from_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)
            .map_err(|source| ConfigError::Parse { path: path.to_owned(), source })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let ViewportSection { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::Invalid {
                path: path.to_owned(),
                message: format!("viewport must be positive, got {}x{}", width, height),
            });
        }
        Ok(())
    }

    pub fn viewport(&self) -> FixedViewport {
        FixedViewport::new(self.viewport.width, self.viewport.height)
    }

    /// Origin the machine re-seeds its pose from on reset
    pub fn start_pose(&self) -> Pose {
        match self.start {
            Some(start) => Pose { x: start.x, y: start.y, angle: start.angle },
            None => Pose {
                x: (self.viewport.width / 2.0).floor(),
                y: (self.viewport.height / 2.0).floor(),
                angle: 0.0,
            },
        }
    }
}
