// Feature engineering and merge onto the daily backbone
pub mod features;
pub mod merge;

// Supervised targets and the model ensemble
pub mod ml;
pub mod targets;

// Vote over model outputs
pub mod recommendation;

// Batch entry points
pub mod pipeline;
