//! Per-target training and the four-model ensemble run.
//!
//! Every target goes through the same steps: drop incomplete rows, order by
//! date, split by position, fit, evaluate on the held-out tail, persist. A
//! target that cannot be trained is skipped without affecting the others.

use super::predictor::{ModelFactory, Predictor};
use crate::domain::errors::PipelineError;
use crate::domain::feature_table::FeatureTable;
use crate::domain::ml::artifact::{
    ComparisonRow, ModelArtifact, ModelMetrics, Split, accuracy, rmse,
};
use crate::domain::ml::feature_registry::present_features;
use crate::domain::ml::targets::{ModelTask, TargetKind, TargetRow};
use crate::infrastructure::ArtifactStore;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

/// The merged feature table with its aligned targets, restricted to rows on or
/// after `train_start`.
pub struct TrainingData<'a> {
    table: &'a FeatureTable,
    targets: &'a [TargetRow],
    train_start: Option<NaiveDate>,
    feature_names: Vec<String>,
    matrix: Vec<Vec<Option<f64>>>,
}

impl<'a> TrainingData<'a> {
    /// `targets` must hold one row per table row, in table order.
    pub fn new(
        table: &'a FeatureTable,
        targets: &'a [TargetRow],
        train_start: Option<NaiveDate>,
    ) -> Self {
        debug_assert_eq!(
            table.len(),
            targets.len(),
            "targets are not aligned with the feature table"
        );
        let in_window = |date: NaiveDate| train_start.is_none_or(|start| date >= start);

        // A column only observed before the window would null every row.
        let candidates = present_features(table.columns());
        let (candidate_matrix, _) = table.select(&candidates);
        let observed: Vec<bool> = (0..candidates.len())
            .map(|c| {
                table
                    .rows()
                    .iter()
                    .zip(&candidate_matrix)
                    .any(|(row, values)| in_window(row.date) && values[c].is_some())
            })
            .collect();
        let feature_names: Vec<String> = candidates
            .into_iter()
            .zip(&observed)
            .filter(|(_, seen)| **seen)
            .map(|(name, _)| name)
            .collect();

        let (matrix, _) = table.select(&feature_names);
        Self {
            table,
            targets,
            train_start,
            feature_names,
            matrix,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Complete (features, label) rows for one target, ordered by date then
    /// symbol.
    fn samples(&self, target: TargetKind) -> Vec<Sample<'_>> {
        let mut samples: Vec<Sample<'_>> = self
            .table
            .rows()
            .iter()
            .zip(self.targets)
            .zip(&self.matrix)
            .filter(|((row, _), _)| self.train_start.is_none_or(|start| row.date >= start))
            .filter_map(|((row, labels), features)| {
                let label = labels.get(target)?;
                if features.iter().any(Option::is_none) {
                    return None;
                }
                Some(Sample {
                    symbol: &row.symbol,
                    date: row.date,
                    features,
                    label,
                })
            })
            .collect();
        samples.sort_by(|a, b| (a.date, a.symbol).cmp(&(b.date, b.symbol)));
        samples
    }
}

struct Sample<'a> {
    symbol: &'a str,
    date: NaiveDate,
    features: &'a Vec<Option<f64>>,
    label: f64,
}

/// Train/test boundary for `n` date-ordered rows: `floor(ratio * n)`.
pub fn split_index(n: usize, ratio: f64) -> usize {
    ((n as f64) * ratio).floor().clamp(0.0, n as f64) as usize
}

/// A fitted target ready to persist.
pub struct TrainedTarget<M> {
    pub artifact: ModelArtifact<M>,
    pub metrics: ModelMetrics,
    pub comparison: Vec<ComparisonRow>,
}

pub enum TargetOutcome<M> {
    Trained(Box<TrainedTarget<M>>),
    Skipped { target: TargetKind, reason: String },
}

/// Value reported for a raw model output: labels for classification tasks.
fn scored(task: ModelTask, raw: f64) -> f64 {
    match task {
        ModelTask::Regression | ModelTask::MultiClass => raw,
        ModelTask::BinaryProbability => {
            if raw > 0.5 {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Runs the train-one-target steps for `target`.
pub fn train_target<F: ModelFactory>(
    factory: &F,
    data: &TrainingData<'_>,
    target: TargetKind,
    split_ratio: f64,
    run_id: Uuid,
) -> TargetOutcome<F::Model> {
    let skip = |reason: String| {
        warn!("Skipping {} model: {}", target, reason);
        TargetOutcome::Skipped { target, reason }
    };

    if data.feature_names.is_empty() {
        return skip("no feature columns available".to_string());
    }
    let samples = data.samples(target);
    if samples.is_empty() {
        return skip("no rows with complete features and target".to_string());
    }
    let split = split_index(samples.len(), split_ratio);
    if split == 0 {
        return skip(format!("{} complete rows leave an empty training split", samples.len()));
    }

    let task = target.task();
    let train_x: Vec<Vec<f64>> = samples[..split]
        .iter()
        .map(|s| s.features.iter().flatten().copied().collect())
        .collect();
    let train_y: Vec<f64> = samples[..split].iter().map(|s| s.label).collect();

    info!(
        "Training {} model on {} rows ({} held out, {} features)",
        target,
        split,
        samples.len() - split,
        data.feature_names.len()
    );
    let model = match factory.fit(task, &train_x, &train_y) {
        Ok(model) => model,
        Err(e) => return skip(e.to_string()),
    };

    let inputs: Vec<Vec<Option<f64>>> = samples.iter().map(|s| s.features.clone()).collect();
    let raw = match model.predict(&inputs) {
        Ok(raw) => raw,
        Err(e) => return skip(e.to_string()),
    };
    let predicted: Vec<f64> = raw.iter().map(|&r| scored(task, r)).collect();
    let actual: Vec<f64> = samples.iter().map(|s| s.label).collect();

    let (test_pred, test_actual) = (&predicted[split..], &actual[split..]);
    let metrics = ModelMetrics {
        model: target,
        rmse: (!target.is_classification())
            .then(|| rmse(test_pred, test_actual))
            .flatten(),
        accuracy: target
            .is_classification()
            .then(|| accuracy(test_pred, test_actual))
            .flatten(),
        train_rows: split,
        test_rows: samples.len() - split,
        run_id,
    };
    match (metrics.rmse, metrics.accuracy) {
        (Some(v), _) => info!("{} model test RMSE: {:.6}", target, v),
        (_, Some(v)) => info!("{} model test accuracy: {:.4}", target, v),
        _ => warn!("{} model has no test rows; no metric recorded", target),
    }

    let comparison = samples
        .iter()
        .zip(&predicted)
        .enumerate()
        .map(|(i, (sample, &pred))| ComparisonRow {
            time: sample.date,
            symbol: sample.symbol.to_string(),
            actual: sample.label,
            pred,
            model: target,
            split: if i < split { Split::Train } else { Split::Test },
        })
        .collect();

    TargetOutcome::Trained(Box::new(TrainedTarget {
        artifact: ModelArtifact {
            target,
            feature_names: data.feature_names.clone(),
            run_id,
            trained_at: Utc::now(),
            model,
        },
        metrics,
        comparison,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTarget {
    pub target: TargetKind,
    pub reason: String,
}

/// Summary of one ensemble training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub run_id: Uuid,
    pub feature_columns: Vec<String>,
    pub metrics: Vec<ModelMetrics>,
    pub skipped: Vec<SkippedTarget>,
}

impl TrainingReport {
    pub fn trained(&self) -> Vec<TargetKind> {
        self.metrics.iter().map(|m| m.model).collect()
    }
}

/// Trains and persists all four targets.
pub struct EnsembleTrainer<F> {
    factory: F,
    store: ArtifactStore,
    split_ratio: f64,
}

impl<F> EnsembleTrainer<F>
where
    F: ModelFactory,
    F::Model: Serialize,
{
    pub fn new(factory: F, store: ArtifactStore, split_ratio: f64) -> Self {
        Self {
            factory,
            store,
            split_ratio,
        }
    }

    /// Fails only when the run-level artifacts cannot be written; individual
    /// targets that cannot be trained or saved are reported as skipped.
    pub fn run(&self, data: &TrainingData<'_>) -> Result<TrainingReport, PipelineError> {
        let run_id = Uuid::new_v4();
        info!(
            "Training run {} started with {} feature columns",
            run_id,
            data.feature_names().len()
        );
        let mut metrics = Vec::new();
        let mut comparison = Vec::new();
        let mut skipped = Vec::new();

        for target in TargetKind::ALL {
            match train_target(&self.factory, data, target, self.split_ratio, run_id) {
                TargetOutcome::Trained(trained) => {
                    if let Err(e) = self.store.save_model(&trained.artifact) {
                        error!("Failed to save {} model: {}", target, e);
                        skipped.push(SkippedTarget {
                            target,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    let TrainedTarget {
                        metrics: m,
                        comparison: c,
                        ..
                    } = *trained;
                    metrics.push(m);
                    comparison.extend(c);
                }
                TargetOutcome::Skipped { target, reason } => {
                    skipped.push(SkippedTarget { target, reason });
                }
            }
        }

        // Run-level files describe the saved models; with none saved, the
        // previous run's files stay consistent with what is on disk.
        if metrics.is_empty() {
            warn!("Training run {} saved no model; keeping previous run files", run_id);
        } else {
            self.store.save_feature_columns(data.feature_names())?;
            self.store.save_metrics(&metrics)?;
            self.store.save_comparison(&comparison)?;
        }
        info!(
            "Training run {} finished: {} trained, {} skipped",
            run_id,
            metrics.len(),
            skipped.len()
        );

        Ok(TrainingReport {
            run_id,
            feature_columns: data.feature_names().to_vec(),
            metrics,
            skipped,
        })
    }
}
