pub mod artifact_store;
pub mod observability;
pub mod sources;

pub use artifact_store::ArtifactStore;
pub use observability::RunLog;
pub use sources::SourceTables;
