//! Source and artifact locations.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Where the six source tables and the artifacts live.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub prices_file: String,
    pub fundamentals_file: String,
    pub bank_ratios_file: String,
    pub macro_file: String,
    pub sentiment_file: String,
    pub fx_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            artifacts_dir: PathBuf::from("artifacts"),
            prices_file: "prices.csv".to_string(),
            fundamentals_file: "fundamentals.csv".to_string(),
            bank_ratios_file: "bank_ratios.csv".to_string(),
            macro_file: "macro.csv".to_string(),
            sentiment_file: "sentiment.csv".to_string(),
            fx_file: "fx.csv".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());
        Self {
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            artifacts_dir: env::var("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifacts_dir),
            prices_file: var("PRICES_FILE", &defaults.prices_file),
            fundamentals_file: var("FUNDAMENTALS_FILE", &defaults.fundamentals_file),
            bank_ratios_file: var("BANK_RATIOS_FILE", &defaults.bank_ratios_file),
            macro_file: var("MACRO_FILE", &defaults.macro_file),
            sentiment_file: var("SENTIMENT_FILE", &defaults.sentiment_file),
            fx_file: var("FX_FILE", &defaults.fx_file),
        }
    }

    pub fn prices_path(&self) -> PathBuf {
        self.data_dir.join(&self.prices_file)
    }

    pub fn fundamentals_path(&self) -> PathBuf {
        self.data_dir.join(&self.fundamentals_file)
    }

    pub fn bank_ratios_path(&self) -> PathBuf {
        self.data_dir.join(&self.bank_ratios_file)
    }

    pub fn macro_path(&self) -> PathBuf {
        self.data_dir.join(&self.macro_file)
    }

    pub fn sentiment_path(&self) -> PathBuf {
        self.data_dir.join(&self.sentiment_file)
    }

    pub fn fx_path(&self) -> PathBuf {
        self.data_dir.join(&self.fx_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.artifacts_dir.join("pipeline.log")
    }
}
