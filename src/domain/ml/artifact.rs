use super::targets::TargetKind;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fitted model plus the ordered feature list it was trained on.
///
/// Immutable once written; a later training run replaces the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact<M> {
    pub target: TargetKind,
    pub feature_names: Vec<String>,
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub model: M,
}

/// Evaluation summary for one trained target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub model: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub run_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

/// One (actual, predicted) pair kept for offline inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub time: NaiveDate,
    pub symbol: String,
    #[serde(rename = "true")]
    pub actual: f64,
    pub pred: f64,
    pub model: TargetKind,
    pub split: Split,
}

/// Root mean squared error; `None` for empty input.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return None;
    }
    let sq: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    Some((sq / predicted.len() as f64).sqrt())
}

/// Share of exact label matches; `None` for empty input.
pub fn accuracy(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return None;
    }
    let hits = predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| (*p - *a).abs() < 1e-9)
        .count();
    Some(hits as f64 / predicted.len() as f64)
}
