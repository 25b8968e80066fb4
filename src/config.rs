//! Application configuration loaded from YAML

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::app::{frame_budget, AppSettings};

fn default_log_level() -> String {
    "info".to_string()
}

fn default_stats_interval() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    /// Stop after this many frames (runs until a shutdown request when omitted)
    #[serde(default)]
    pub frame_limit: Option<u64>,
    /// Target frames per second; 0 disables pacing
    #[serde(default)]
    pub frame_rate: f64,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    /// Scroll inputs injected on fixed frames
    #[serde(default)]
    pub input: Vec<ScriptedScroll>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_interval")]
    pub interval_frames: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_frames: default_stats_interval(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedScroll {
    pub frame: u64,
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
}

impl AppConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(text).context("Failed to parse application config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.name.trim().is_empty(),
            "application name must not be empty"
        );
        ensure!(
            self.frame_rate.is_finite() && self.frame_rate >= 0.0,
            "frame_rate must be a non-negative number, got {}",
            self.frame_rate
        );
        frame_budget(self.frame_rate).context("frame_rate is too small to pace frames")?;
        ensure!(
            self.stats.interval_frames > 0,
            "stats.interval_frames must be greater than zero"
        );
        Ok(())
    }

    pub fn settings(&self) -> AppSettings {
        AppSettings {
            name: self.name.clone(),
            frame_rate: self.frame_rate,
        }
    }

    pub fn frames(&self, override_frames: Option<u64>) -> Option<u64> {
        override_frames.or(self.frame_limit)
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<AppConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        AppConfig::from_yaml_str(&data)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}
