//! Per-play feature assembly and batch runs

pub mod assembler;
pub mod summary;

pub use assembler::{FeatureAssembler, FeatureRun, PlayFeatures, PlayLabels, PlayOutcome};
pub use summary::{RunSummary, SkippedPlay};
