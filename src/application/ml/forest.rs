//! SmartCore random forests behind the [`Predictor`] seam.

use super::predictor::{ModelFactory, Predictor};
use crate::config::ForestParams;
use crate::domain::errors::PipelineError;
use crate::domain::ml::targets::ModelTask;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fmt;

type Regressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;
type Classifier = RandomForestClassifier<f64, i64, DenseMatrix<f64>, Vec<i64>>;

/// Stand-in for a null cell. Training rows never contain nulls, so every
/// split threshold is above this value and a null always takes the low branch.
pub const NULL_SENTINEL: f64 = f64::MIN;

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "forest", rename_all = "snake_case")]
pub enum ForestModel {
    /// Continuous target.
    Regression(Regressor),
    /// Regression over {0, 1} labels; the leaf mean is the probability of 1.
    Probability(Regressor),
    /// Integer class labels.
    Classification(Classifier),
}

impl fmt::Debug for ForestModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForestModel::{}", self.name())
    }
}

pub fn encode_row(row: &[Option<f64>]) -> Vec<f64> {
    row.iter().map(|v| v.unwrap_or(NULL_SENTINEL)).collect()
}

fn to_matrix(rows: Vec<Vec<f64>>) -> Result<DenseMatrix<f64>, PipelineError> {
    DenseMatrix::from_2d_vec(&rows)
        .map_err(|e| PipelineError::Model(format!("Matrix creation failed: {}", e)))
}

impl Predictor for ForestModel {
    fn predict(&self, rows: &[Vec<Option<f64>>]) -> Result<Vec<f64>, PipelineError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let encoded: Vec<Vec<f64>> = rows.iter().map(|r| encode_row(r)).collect();
        let matrix = to_matrix(encoded)?;
        let failed = |e: smartcore::error::Failed| {
            PipelineError::Model(format!("Prediction failed: {}", e))
        };

        match self {
            ForestModel::Regression(model) => model.predict(&matrix).map_err(failed),
            ForestModel::Probability(model) => Ok(model
                .predict(&matrix)
                .map_err(failed)?
                .into_iter()
                .map(|p| p.clamp(0.0, 1.0))
                .collect()),
            ForestModel::Classification(model) => Ok(model
                .predict(&matrix)
                .map_err(failed)?
                .into_iter()
                .map(|label| label as f64)
                .collect()),
        }
    }

    fn name(&self) -> &str {
        match self {
            ForestModel::Regression(_) => "RandomForestRegressor",
            ForestModel::Probability(_) => "RandomForestProbability",
            ForestModel::Classification(_) => "RandomForestClassifier",
        }
    }
}

/// Fits one forest per call with shared hyper-parameters.
#[derive(Debug, Clone, Copy)]
pub struct ForestFactory {
    params: ForestParams,
}

impl ForestFactory {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }
}

impl ModelFactory for ForestFactory {
    type Model = ForestModel;

    fn fit(
        &self,
        task: ModelTask,
        rows: &[Vec<f64>],
        labels: &[f64],
    ) -> Result<ForestModel, PipelineError> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(PipelineError::Model(format!(
                "Cannot fit on {} rows with {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let x = to_matrix(rows.to_vec())?;
        let failed = |e: smartcore::error::Failed| {
            PipelineError::Model(format!("Training error: {}", e))
        };

        match task {
            ModelTask::Regression | ModelTask::BinaryProbability => {
                let params = RandomForestRegressorParameters::default()
                    .with_n_trees(usize::from(self.params.n_trees))
                    .with_max_depth(self.params.max_depth)
                    .with_min_samples_split(self.params.min_samples_split);
                let y = labels.to_vec();
                let model = RandomForestRegressor::fit(&x, &y, params).map_err(failed)?;
                Ok(if task == ModelTask::Regression {
                    ForestModel::Regression(model)
                } else {
                    ForestModel::Probability(model)
                })
            }
            ModelTask::MultiClass => {
                let params = RandomForestClassifierParameters::default()
                    .with_n_trees(self.params.n_trees)
                    .with_max_depth(self.params.max_depth)
                    .with_min_samples_split(self.params.min_samples_split);
                let y: Vec<i64> = labels.iter().map(|l| l.round() as i64).collect();
                let model = RandomForestClassifier::fit(&x, &y, params).map_err(failed)?;
                Ok(ForestModel::Classification(model))
            }
        }
    }
}
