// Daily price, sentiment and FX records
pub mod market;

// Quarterly fundamentals and macro records
pub mod fundamentals;

// Daily/quarterly join key
pub mod quarter;

// The merged (symbol, date) feature table
pub mod feature_table;

// Feature registry and supervised targets
pub mod ml;

// Inference outputs
pub mod signal;

// Domain-specific error types
pub mod errors;
