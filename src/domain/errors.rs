use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the feature, training and inference pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Required data missing at {path}: {reason}")]
    DataMissing { path: PathBuf, reason: String },

    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model artifact not found at {path}")]
    ArtifactMissing { path: PathBuf },

    #[error("Model artifact at {path} is unusable: {reason}")]
    ArtifactCorrupt { path: PathBuf, reason: String },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        PipelineError::Csv {
            path: path.into(),
            source,
        }
    }

    /// True for the single category of failure that must abort a run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::DataMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_missing_formatting() {
        let err = PipelineError::DataMissing {
            path: PathBuf::from("data/prices.csv"),
            reason: "file not found".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("data/prices.csv"));
        assert!(msg.contains("file not found"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_model_error_is_not_fatal() {
        let err = PipelineError::Model("Incorrect number of classes".to_string());
        assert!(!err.is_fatal());
        assert!(err.to_string().starts_with("Model error"));
    }
}
