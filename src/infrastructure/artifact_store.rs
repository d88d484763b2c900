//! Persistence for training artifacts.
//!
//! Every file is written to a uniquely named temp file in the same directory,
//! synced, then renamed over the target, so a concurrent inference run only
//! ever sees the previous or the new complete file.

use crate::domain::errors::PipelineError;
use crate::domain::ml::artifact::{ComparisonRow, ModelArtifact, ModelMetrics};
use crate::domain::ml::targets::TargetKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const FEATURE_COLS_FILE: &str = "feature_cols.json";
const METRICS_FILE: &str = "metrics.json";
const COMPARISON_FILE: &str = "comparison_data.json";

/// Handles the artifacts directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The model envelope, serialized with serde_json despite the `.bin`
    /// extension.
    pub fn model_path(&self, target: TargetKind) -> PathBuf {
        self.dir.join(format!("{}_model.bin", target.name()))
    }

    pub fn features_path(&self, target: TargetKind) -> PathBuf {
        self.dir.join(format!("{}_features.json", target.name()))
    }

    pub fn feature_cols_path(&self) -> PathBuf {
        self.dir.join(FEATURE_COLS_FILE)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    pub fn comparison_path(&self) -> PathBuf {
        self.dir.join(COMPARISON_FILE)
    }

    /// Persists a fitted model and its feature-list sidecar.
    pub fn save_model<M: Serialize>(
        &self,
        artifact: &ModelArtifact<M>,
    ) -> Result<(), PipelineError> {
        self.write_json_atomic(&self.model_path(artifact.target), artifact)?;
        self.write_json_atomic(&self.features_path(artifact.target), &artifact.feature_names)?;
        info!(
            "Saved {} model ({} features) to {:?}",
            artifact.target,
            artifact.feature_names.len(),
            self.model_path(artifact.target)
        );
        Ok(())
    }

    /// Loads a model. Absent files are `ArtifactMissing`; anything unreadable
    /// or inconsistent is `ArtifactCorrupt`.
    pub fn load_model<M: DeserializeOwned>(
        &self,
        target: TargetKind,
    ) -> Result<ModelArtifact<M>, PipelineError> {
        let path = self.model_path(target);
        let artifact: ModelArtifact<M> = self.read_json(&path)?;

        if artifact.target != target {
            return Err(PipelineError::ArtifactCorrupt {
                path,
                reason: format!("holds a {} model", artifact.target),
            });
        }
        if artifact.feature_names.is_empty() {
            return Err(PipelineError::ArtifactCorrupt {
                path,
                reason: "empty feature list".to_string(),
            });
        }

        // The envelope is authoritative; the sidecar is an export for humans.
        match self.read_json::<Vec<String>>(&self.features_path(target)) {
            Ok(sidecar) if sidecar != artifact.feature_names => {
                warn!(
                    "{} feature sidecar disagrees with the model envelope; using the envelope",
                    target
                );
            }
            Ok(_) => {}
            Err(e) => debug!("No usable {} feature sidecar: {}", target, e),
        }

        debug!("Loaded {} model from {:?} (run {})", target, path, artifact.run_id);
        Ok(artifact)
    }

    pub fn save_feature_columns(&self, columns: &[String]) -> Result<(), PipelineError> {
        self.write_json_atomic(&self.feature_cols_path(), columns)
    }

    pub fn load_feature_columns(&self) -> Result<Vec<String>, PipelineError> {
        self.read_json(&self.feature_cols_path())
    }

    pub fn save_metrics(&self, metrics: &[ModelMetrics]) -> Result<(), PipelineError> {
        self.write_json_atomic(&self.metrics_path(), metrics)
    }

    pub fn load_metrics(&self) -> Result<Vec<ModelMetrics>, PipelineError> {
        self.read_json(&self.metrics_path())
    }

    pub fn save_comparison(&self, rows: &[ComparisonRow]) -> Result<(), PipelineError> {
        self.write_json_atomic(&self.comparison_path(), rows)
    }

    pub fn load_comparison(&self) -> Result<Vec<ComparisonRow>, PipelineError> {
        self.read_json(&self.comparison_path())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::ArtifactMissing {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| PipelineError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn write_json_atomic<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::io(&self.dir, e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = self
            .dir
            .join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

        let result = (|| -> Result<(), PipelineError> {
            let file = File::create(&temp_path).map_err(|e| PipelineError::io(&temp_path, e))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, value)?;
            writer.flush().map_err(|e| PipelineError::io(&temp_path, e))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| PipelineError::io(&temp_path, e))?;
            fs::rename(&temp_path, path).map_err(|e| PipelineError::io(path, e))
        })();

        if result.is_err() {
            fs::remove_file(&temp_path).ok();
        }
        result
    }
}
