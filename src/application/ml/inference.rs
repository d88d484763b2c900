//! Latest-row scoring with the persisted ensemble.

use super::predictor::Predictor;
use crate::application::recommendation::{ModelOutputs, aggregate};
use crate::domain::errors::PipelineError;
use crate::domain::feature_table::FeatureTable;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ml::targets::TargetKind;
use crate::domain::signal::{Direction, Regime, SignalBundle};
use crate::infrastructure::ArtifactStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Symbol filter value that selects every symbol.
pub const ALL_SYMBOLS: &str = "ALL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InferenceStatus {
    Ok,
    ModelsUnavailable,
    DataUnavailable,
    NoMatchingRows,
    PredictionFailed,
}

/// What an inference run hands back to its caller. Failures are reported
/// through `status` rather than as errors.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceReport {
    pub status: InferenceStatus,
    pub signals: Vec<SignalBundle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InferenceReport {
    pub fn ok(signals: Vec<SignalBundle>) -> Self {
        Self {
            status: InferenceStatus::Ok,
            signals,
            message: None,
        }
    }

    pub fn failed(status: InferenceStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            signals: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == InferenceStatus::Ok
    }
}

/// The four persisted models. Return and direction are required; risk and
/// regime only enrich the bundle.
pub struct EnsembleModels<M> {
    pub return_model: ModelArtifact<M>,
    pub direction_model: ModelArtifact<M>,
    pub risk_model: Option<ModelArtifact<M>>,
    pub regime_model: Option<ModelArtifact<M>>,
}

impl<M: DeserializeOwned> EnsembleModels<M> {
    pub fn load(store: &ArtifactStore) -> Result<Self, PipelineError> {
        let optional = |target: TargetKind| match store.load_model(target) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!("{} model unavailable, continuing without it: {}", target, e);
                None
            }
        };
        Ok(Self {
            return_model: store.load_model(TargetKind::Return)?,
            direction_model: store.load_model(TargetKind::Direction)?,
            risk_model: optional(TargetKind::Risk),
            regime_model: optional(TargetKind::Regime),
        })
    }
}

/// Scores `rows` of `table` with one model, filling columns the table lacks
/// with nulls.
fn predict_rows<M: Predictor>(
    artifact: &ModelArtifact<M>,
    table: &FeatureTable,
    rows: &[usize],
) -> Result<Vec<f64>, PipelineError> {
    let (matrix, missing) = table.select(&artifact.feature_names);
    if !missing.is_empty() {
        warn!(
            "{} model expects {} columns absent from the live table, filling with null: {:?}",
            artifact.target,
            missing.len(),
            missing
        );
    }
    let inputs: Vec<Vec<Option<f64>>> = rows.iter().map(|&i| matrix[i].clone()).collect();
    artifact.model.predict(&inputs)
}

/// Row indices of the latest row per symbol, optionally restricted to one
/// symbol (`None` or [`ALL_SYMBOLS`] keeps all).
pub fn latest_rows(table: &FeatureTable, symbol: Option<&str>) -> Vec<usize> {
    let filter = symbol
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SYMBOLS));
    table
        .latest_per_symbol()
        .into_iter()
        .filter(|&i| filter.is_none_or(|s| table.rows()[i].symbol.eq_ignore_ascii_case(s)))
        .collect()
}

impl<M: Predictor> EnsembleModels<M> {
    /// One bundle per requested row, in the order of `rows`.
    pub fn predict(
        &self,
        table: &FeatureTable,
        rows: &[usize],
    ) -> Result<Vec<SignalBundle>, PipelineError> {
        let returns = predict_rows(&self.return_model, table, rows)?;
        let probabilities = predict_rows(&self.direction_model, table, rows)?;
        let risks = self
            .risk_model
            .as_ref()
            .map(|m| predict_rows(m, table, rows))
            .transpose()?;
        let regimes = self
            .regime_model
            .as_ref()
            .map(|m| predict_rows(m, table, rows))
            .transpose()?;

        Ok(rows
            .iter()
            .enumerate()
            .map(|(k, &i)| {
                let row = &table.rows()[i];
                let probability = probabilities[k];
                let outputs = ModelOutputs {
                    predicted_return: returns[k],
                    predicted_volatility: risks.as_ref().map(|r| r[k]),
                    regime: regimes
                        .as_ref()
                        .and_then(|r| Regime::from_label(r[k].round() as i64)),
                    direction: Direction::from_probability(probability),
                    direction_probability: Some(probability),
                };
                aggregate(&row.symbol, row.date, outputs)
            })
            .collect())
    }

    /// Scores the latest row per symbol and wraps the outcome in a report.
    pub fn infer_latest(&self, table: &FeatureTable, symbol: Option<&str>) -> InferenceReport {
        let rows = latest_rows(table, symbol);
        if rows.is_empty() {
            let message = match symbol {
                Some(s) => format!("No feature rows for symbol {}", s),
                None => "Feature table is empty".to_string(),
            };
            warn!("{}", message);
            return InferenceReport::failed(InferenceStatus::NoMatchingRows, message);
        }

        match self.predict(table, &rows) {
            Ok(signals) => {
                info!("Produced {} signals", signals.len());
                InferenceReport::ok(signals)
            }
            Err(e) => {
                warn!("Prediction failed: {}", e);
                InferenceReport::failed(InferenceStatus::PredictionFailed, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Recommendation;
    use chrono::{NaiveDate, Utc};
    use serde::Deserialize;
    use uuid::Uuid;

    /// Returns the first feature, or a constant when it is null.
    #[derive(Serialize, Deserialize)]
    struct FirstFeature {
        when_null: f64,
    }

    impl Predictor for FirstFeature {
        fn predict(&self, rows: &[Vec<Option<f64>>]) -> Result<Vec<f64>, PipelineError> {
            Ok(rows
                .iter()
                .map(|r| r.first().copied().flatten().unwrap_or(self.when_null))
                .collect())
        }

        fn name(&self) -> &str {
            "first"
        }
    }

    fn artifact(target: TargetKind, feature: &str, when_null: f64) -> ModelArtifact<FirstFeature> {
        ModelArtifact {
            target,
            feature_names: vec![feature.to_string()],
            run_id: Uuid::nil(),
            trained_at: Utc::now(),
            model: FirstFeature { when_null },
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn table() -> FeatureTable {
        let mut table = FeatureTable::from_keys(vec![
            ("ACB".to_string(), date(1)),
            ("ACB".to_string(), date(2)),
            ("VCB".to_string(), date(1)),
        ]);
        table.push_column("ret_21d", vec![Some(0.1), Some(0.05), Some(-0.04)]);
        table.push_column("RSI_14", vec![Some(0.9), Some(0.8), Some(0.2)]);
        table
    }

    fn ensemble() -> EnsembleModels<FirstFeature> {
        EnsembleModels {
            return_model: artifact(TargetKind::Return, "ret_21d", 0.0),
            direction_model: artifact(TargetKind::Direction, "RSI_14", 0.5),
            risk_model: None,
            regime_model: Some(artifact(TargetKind::Regime, "ROE_z", 1.0)),
        }
    }

    #[test]
    fn test_latest_row_per_symbol() {
        let report = ensemble().infer_latest(&table(), None);

        assert!(report.is_ok());
        assert_eq!(report.signals.len(), 2);
        let acb = &report.signals[0];
        assert_eq!((acb.symbol.as_str(), acb.date), ("ACB", date(2)));
        assert_eq!(acb.recommendation, Recommendation::Buy);
        assert_eq!(report.signals[1].recommendation, Recommendation::Sell);
    }

    #[test]
    fn test_missing_column_filled_with_null() {
        let report = ensemble().infer_latest(&table(), Some("VCB"));

        // ROE_z is absent; the regime model sees a null.
        assert_eq!(report.signals[0].regime, Some(Regime::Neutral));
        assert_eq!(report.signals[0].predicted_volatility_21d, None);
    }

    #[test]
    fn test_symbol_filter() {
        let models = ensemble();
        assert_eq!(models.infer_latest(&table(), Some("all")).signals.len(), 2);
        assert_eq!(models.infer_latest(&table(), Some("vcb")).signals.len(), 1);

        let report = models.infer_latest(&table(), Some("XYZ"));
        assert_eq!(report.status, InferenceStatus::NoMatchingRows);
        assert!(report.signals.is_empty());
    }

    #[test]
    fn test_load_requires_return_and_direction() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store
            .save_model(&artifact(TargetKind::Return, "ret_21d", 0.0))
            .unwrap();
        assert!(EnsembleModels::<FirstFeature>::load(&store).is_err());

        store
            .save_model(&artifact(TargetKind::Direction, "RSI_14", 0.5))
            .unwrap();
        let models = EnsembleModels::<FirstFeature>::load(&store).unwrap();
        assert!(models.risk_model.is_none());
        assert!(models.regime_model.is_none());
    }

    #[test]
    fn test_report_serializes_status() {
        let report = InferenceReport::failed(InferenceStatus::ModelsUnavailable, "no models");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "ModelsUnavailable");
        assert_eq!(json["signals"].as_array().unwrap().len(), 0);
    }
}
