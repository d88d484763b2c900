//! Batch entry points: retrain and latest-signal inference.
//!
//! Each run builds its tables from the source files; the only state shared
//! between runs is the artifact directory.

use crate::application::merge::build_feature_table;
use crate::application::ml::{
    EnsembleModels, EnsembleTrainer, ForestFactory, ForestModel, InferenceReport,
    InferenceStatus, TrainingData, TrainingReport,
};
use crate::application::targets::build_targets;
use crate::config::PipelineConfig;
use crate::domain::errors::PipelineError;
use crate::infrastructure::{ArtifactStore, SourceTables};
use tracing::{error, info, warn};

/// Loads sources, builds features and targets, and trains the ensemble.
///
/// Missing prices abort the run before any model is touched. A failed run is
/// logged here so it reaches the log artifact.
pub fn run_training(config: &PipelineConfig) -> Result<TrainingReport, PipelineError> {
    info!("Starting retrain pipeline");
    let result = train(config);
    if let Err(e) = &result {
        error!("Retrain failed: {}", e);
    }
    result
}

fn train(config: &PipelineConfig) -> Result<TrainingReport, PipelineError> {
    let sources = SourceTables::load(&config.paths)?;
    if sources.prices.is_empty() {
        return Err(PipelineError::DataMissing {
            path: config.paths.prices_path(),
            reason: "no usable price rows".to_string(),
        });
    }

    let table = build_feature_table(&sources);
    let targets = build_targets(&sources.prices, config.prediction_horizon);
    let data = TrainingData::new(&table, &targets, config.train_start_date);

    let store = ArtifactStore::new(&config.paths.artifacts_dir);
    let trainer = EnsembleTrainer::new(
        ForestFactory::new(config.forest),
        store,
        config.train_split_ratio,
    );
    let report = trainer.run(&data)?;

    if report.metrics.is_empty() {
        warn!("Retrain finished without a single trained model");
    }
    Ok(report)
}

/// Scores the latest row of every symbol (or of `symbol`). Never fails:
/// problems are reported through the report status.
pub fn run_inference(config: &PipelineConfig, symbol: Option<&str>) -> InferenceReport {
    let store = ArtifactStore::new(&config.paths.artifacts_dir);
    let models = match EnsembleModels::<ForestModel>::load(&store) {
        Ok(models) => models,
        Err(e) => {
            warn!("Models unavailable: {}", e);
            return InferenceReport::failed(InferenceStatus::ModelsUnavailable, e.to_string());
        }
    };

    let sources = match SourceTables::load(&config.paths) {
        Ok(sources) if !sources.prices.is_empty() => sources,
        Ok(_) => {
            return InferenceReport::failed(
                InferenceStatus::DataUnavailable,
                format!("No usable price rows in {:?}", config.paths.prices_path()),
            );
        }
        Err(e) => {
            warn!("Market data unavailable: {}", e);
            return InferenceReport::failed(InferenceStatus::DataUnavailable, e.to_string());
        }
    };

    let table = build_feature_table(&sources);
    models.infer_latest(&table, symbol)
}
