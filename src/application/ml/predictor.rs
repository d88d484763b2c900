use crate::domain::errors::PipelineError;
use crate::domain::ml::targets::ModelTask;

/// A fitted model that scores feature rows.
pub trait Predictor {
    /// One raw output per row, in input order. Null cells must be accepted.
    ///
    /// Regression tasks return the predicted value, binary tasks the
    /// probability of label 1, multi-class tasks the predicted label.
    fn predict(&self, rows: &[Vec<Option<f64>>]) -> Result<Vec<f64>, PipelineError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

/// Builds a fitted [`Predictor`] from complete training rows.
pub trait ModelFactory {
    type Model: Predictor;

    fn fit(
        &self,
        task: ModelTask,
        rows: &[Vec<f64>],
        labels: &[f64],
    ) -> Result<Self::Model, PipelineError>;
}
