//! CSV source loaders.
//!
//! Prices are required; every other source is optional and degrades to an
//! empty table (with a warning) when absent or unreadable.

pub mod daily;
pub mod normalize;
pub mod quarterly;

use crate::config::PathsConfig;
use crate::domain::errors::PipelineError;
use crate::domain::fundamentals::{MacroRecord, QuarterlyRecord};
use crate::domain::market::{DailyRecord, FxRecord, SentimentRecord};
use std::path::Path;
use tracing::{info, warn};

/// Normalized tables for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub prices: Vec<DailyRecord>,
    pub fundamentals: Vec<QuarterlyRecord>,
    pub macro_series: Vec<MacroRecord>,
    pub sentiment: Vec<SentimentRecord>,
    pub fx: Vec<FxRecord>,
}

impl SourceTables {
    /// Reads every source named by `paths`. Only missing prices is an error.
    pub fn load(paths: &PathsConfig) -> Result<Self, PipelineError> {
        info!("Loading market data...");
        let prices = daily::load_prices(&paths.prices_path())?;

        info!("Loading quarterly data (fundamentals + macro)...");
        let bank_ratios = paths.bank_ratios_path();
        let bank_ratios = bank_ratios.exists().then_some(bank_ratios);
        let fundamentals = load_optional("fundamentals", &paths.fundamentals_path(), |p| {
            quarterly::load_fundamentals(p, bank_ratios.as_deref())
        });
        let macro_series = load_optional("macro", &paths.macro_path(), quarterly::load_macro);

        let sentiment = load_optional("sentiment", &paths.sentiment_path(), daily::load_sentiment);
        let fx = load_optional("FX", &paths.fx_path(), daily::load_fx);

        Ok(Self {
            prices,
            fundamentals,
            macro_series,
            sentiment,
            fx,
        })
    }
}

fn load_optional<T, F>(label: &str, path: &Path, loader: F) -> Vec<T>
where
    F: FnOnce(&Path) -> Result<Vec<T>, PipelineError>,
{
    if !path.exists() {
        warn!("{} data not found at {:?}; continuing without it", label, path);
        return Vec::new();
    }
    match loader(path) {
        Ok(rows) => {
            info!("Loaded {} {} rows from {:?}", rows.len(), label, path);
            rows
        }
        Err(e) => {
            warn!("Failed to load {} data: {}; continuing without it", label, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn paths_in(dir: &Path) -> PathsConfig {
        PathsConfig {
            data_dir: dir.to_path_buf(),
            artifacts_dir: dir.join("artifacts"),
            ..PathsConfig::default()
        }
    }

    #[test]
    fn test_optional_sources_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("prices.csv"),
            "symbol,date,open,high,low,close,volume\nVCB,2024-01-02,1,1,1,1,1\n",
        )
        .unwrap();
        // Present but unreadable as a table with the expected shape.
        fs::write(dir.path().join("fx.csv"), "\u{0}\u{0}\n\"unterminated").unwrap();

        let tables = SourceTables::load(&paths_in(dir.path())).unwrap();
        assert_eq!(tables.prices.len(), 1);
        assert!(tables.fundamentals.is_empty());
        assert!(tables.macro_series.is_empty());
        assert!(tables.sentiment.is_empty());
        assert!(tables.fx.is_empty());
    }

    #[test]
    fn test_missing_prices_aborts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fx.csv"), "date,close\n2024-01-02,1\n").unwrap();

        let err = SourceTables::load(&paths_in(dir.path())).unwrap_err();
        assert!(matches!(err, PipelineError::DataMissing { .. }));
    }
}
