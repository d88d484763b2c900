//! Configuration module for signalfuse.
//!
//! Settings come from environment variables (optionally seeded from `.env`)
//! or from a TOML file with the same keys in lower case.

mod model_config;
mod paths_config;

pub use model_config::ForestParams;
pub use paths_config::PathsConfig;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::env;
use std::path::Path;

pub const DEFAULT_HORIZON: usize = 21;
pub const DEFAULT_SPLIT_RATIO: f64 = 0.8;

/// Main pipeline configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub forest: ForestParams,
    /// Trading days a target looks forward.
    pub prediction_horizon: usize,
    /// Fraction of date-ordered rows used for fitting.
    pub train_split_ratio: f64,
    /// Rows dated earlier are excluded from training (not from look-backs).
    pub train_start_date: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            forest: ForestParams::default(),
            prediction_horizon: DEFAULT_HORIZON,
            train_split_ratio: DEFAULT_SPLIT_RATIO,
            train_start_date: NaiveDate::from_ymd_opt(2015, 1, 1),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let paths = PathsConfig::from_env();
        let forest = ForestParams::from_env().context("Failed to load forest config")?;

        let prediction_horizon = Self::parse_usize("PREDICTION_HORIZON", DEFAULT_HORIZON)?;
        let train_split_ratio = Self::parse_f64("TRAIN_SPLIT_RATIO", DEFAULT_SPLIT_RATIO)?;

        let train_start_date = match env::var("TRAIN_START_DATE") {
            Ok(s) if s.trim().is_empty() => None,
            Ok(s) => Some(
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .context("Failed to parse TRAIN_START_DATE - expected YYYY-MM-DD")?,
            ),
            Err(_) => Self::default().train_start_date,
        };

        let config = Self {
            paths,
            forest,
            prediction_horizon,
            train_split_ratio,
            train_start_date,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. Missing keys take defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.prediction_horizon == 0 {
            anyhow::bail!("PREDICTION_HORIZON must be at least 1");
        }
        if !(self.train_split_ratio > 0.0 && self.train_split_ratio < 1.0) {
            anyhow::bail!(
                "TRAIN_SPLIT_RATIO must be in (0, 1), got {}",
                self.train_split_ratio
            );
        }
        Ok(())
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }
}
