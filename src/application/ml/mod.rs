pub mod forest;
pub mod inference;
pub mod predictor;
pub mod trainer;

pub use forest::{ForestFactory, ForestModel};
pub use inference::{EnsembleModels, InferenceReport, InferenceStatus};
pub use predictor::{ModelFactory, Predictor};
pub use trainer::{EnsembleTrainer, TrainingData, TrainingReport};
