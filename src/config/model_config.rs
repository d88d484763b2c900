//! Random forest hyper-parameters.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Shared by all four forests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: u16,
    pub max_depth: u16,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 5,
            min_samples_split: 5,
        }
    }
}

impl ForestParams {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            n_trees: env::var("FOREST_N_TREES")
                .unwrap_or_else(|_| defaults.n_trees.to_string())
                .parse::<u16>()
                .context("Failed to parse FOREST_N_TREES")?,
            max_depth: env::var("FOREST_MAX_DEPTH")
                .unwrap_or_else(|_| defaults.max_depth.to_string())
                .parse::<u16>()
                .context("Failed to parse FOREST_MAX_DEPTH")?,
            min_samples_split: env::var("FOREST_MIN_SAMPLES_SPLIT")
                .unwrap_or_else(|_| defaults.min_samples_split.to_string())
                .parse::<usize>()
                .context("Failed to parse FOREST_MIN_SAMPLES_SPLIT")?,
        })
    }
}
