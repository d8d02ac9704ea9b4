use polars::prelude::PolarsError;
use thiserror::Error;

use crate::models::{KeyEvent, PlayKey};

/// Pipeline error types
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A required anchor event never appears in the play's tracking data
    #[error("no `{event}` event in tracking data for play {key}")]
    MissingEvent { key: PlayKey, event: KeyEvent },

    /// The ball has no tracking row on the frame used as the LOS anchor
    #[error("ball not tracked at frame {frame_id} of play {key}")]
    MissingBall { key: PlayKey, frame_id: i64 },

    /// Too few distinct points for hull or cluster geometry
    #[error("degenerate formation: {0}")]
    DegenerateFormation(String),

    /// A value the feature vector needs is null for this play
    #[error("missing value for `{field}` on play {key}")]
    MissingValue { key: PlayKey, field: &'static str },

    /// Corrupt input: bad play direction, duplicate play row, unmatched club
    #[error("schema error: {0}")]
    Schema(String),

    #[error("play {0} not found")]
    UnknownPlay(PlayKey),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl FeatureError {
    /// Fatal errors abort the whole run; the rest only exclude one play.
    pub fn is_fatal(&self) -> bool {
        match self {
            FeatureError::Schema(_) => true,
            FeatureError::UnknownPlay(_) => true,
            FeatureError::Polars(_) => true,
            FeatureError::MissingEvent { .. } => false,
            FeatureError::MissingBall { .. } => false,
            FeatureError::DegenerateFormation(_) => false,
            FeatureError::MissingValue { .. } => false,
        }
    }

    /// Short stable name used to bucket skip counts
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureError::MissingEvent { .. } => "missing_event",
            FeatureError::MissingBall { .. } => "missing_ball",
            FeatureError::DegenerateFormation(_) => "degenerate_formation",
            FeatureError::MissingValue { .. } => "missing_value",
            FeatureError::Schema(_) => "schema",
            FeatureError::UnknownPlay(_) => "unknown_play",
            FeatureError::Polars(_) => "polars",
        }
    }
}

pub type Result<T> = std::result::Result<T, FeatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PlayKey {
        PlayKey::new(2022091200, 64)
    }

    #[test]
    fn test_per_play_errors_are_not_fatal() {
        let err = FeatureError::MissingEvent {
            key: key(),
            event: KeyEvent::BallSnap,
        };
        assert!(!err.is_fatal());
        assert!(!FeatureError::DegenerateFormation("collinear".to_string()).is_fatal());
        assert!(!FeatureError::MissingBall {
            key: key(),
            frame_id: 3
        }
        .is_fatal());
    }

    #[test]
    fn test_schema_errors_are_fatal() {
        assert!(FeatureError::Schema("bad direction".to_string()).is_fatal());
        assert!(FeatureError::UnknownPlay(key()).is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = FeatureError::MissingEvent {
            key: key(),
            event: KeyEvent::LineSet,
        };
        let msg = err.to_string();
        assert!(msg.contains("line_set"));
        assert!(msg.contains("2022091200-64"));
    }

    #[test]
    fn test_error_kind() {
        let err = FeatureError::MissingValue {
            key: key(),
            field: "down",
        };
        assert_eq!(err.kind(), "missing_value");
    }
}
