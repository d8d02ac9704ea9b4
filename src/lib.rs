//! Presnap - pre-snap formation features from player tracking data
//!
//! This library provides:
//! - Field normalization so every play runs toward increasing x
//! - A play index over tracking, play, and player-play tables
//! - Line-of-scrimmage anchored zones and key-event segmentation
//! - Formation geometry (centroids, extents, convex hull, ordered clusters)
//! - Pre-snap motion deltas and a per-play feature assembler
//!
//! # Example
//!
//! ```no_run
//! use presnap::data::{PlayIndex, RawTables};
//! use presnap::pipeline::FeatureAssembler;
//! use presnap::FeatureConfig;
//!
//! let tables = RawTables::from_data_dir("data", &[]).unwrap();
//! let index = PlayIndex::new(tables).unwrap();
//! let assembler = FeatureAssembler::new(index, FeatureConfig::default());
//!
//! let run = assembler.run_all().unwrap();
//! println!("{}", run.summary);
//! ```

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use config::FeatureConfig;
pub use error::{FeatureError, Result};
pub use features::FeatureVector;
pub use models::{KeyEvent, PlayDirection, PlayInfo, PlayKey, TeamLabel, TrackingRow};
pub use pipeline::{FeatureAssembler, FeatureRun, PlayOutcome, RunSummary};
