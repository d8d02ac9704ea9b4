//! Run bookkeeping: how many plays produced features and why the rest
//! were skipped

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use crate::error::FeatureError;
use crate::models::PlayKey;

/// A play excluded from the output, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPlay {
    pub key: PlayKey,
    /// Stable reason bucket, e.g. `missing_event`
    pub kind: String,
    pub reason: String,
}

impl SkippedPlay {
    pub fn from_error(key: PlayKey, err: &FeatureError) -> Self {
        Self {
            key,
            kind: err.kind().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Processed vs skipped counts for one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub skip_reasons: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&mut self) {
        self.processed += 1;
    }

    pub fn record_skip(&mut self, skip: &SkippedPlay) {
        self.skipped += 1;
        *self.skip_reasons.entry(skip.kind.clone()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped
    }

    pub fn skip_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.skipped as f64 / self.total() as f64
        }
    }

    pub fn log(&self) {
        info!(
            "Feature run finished: {} processed, {} skipped ({:.1}%)",
            self.processed,
            self.skipped,
            self.skip_rate() * 100.0
        );
        for (kind, count) in &self.skip_reasons {
            info!("  skipped {}: {}", kind, count);
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plays:     {}", self.total())?;
        writeln!(f, "Processed: {}", self.processed)?;
        write!(f, "Skipped:   {}", self.skipped)?;
        for (kind, count) in &self.skip_reasons {
            write!(f, "\n  {:<22} {}", kind, count)?;
        }
        Ok(())
    }
}
