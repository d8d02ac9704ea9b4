//! Field normalization
//!
//! Rewrites every tracking row as if the offense were moving toward
//! increasing x, so formation geometry is comparable across plays.

use polars::prelude::*;

use crate::error::{FeatureError, Result};
use crate::models::PlayDirection;

/// Field length in yards, end line to end line
pub const FIELD_LENGTH: f64 = 120.0;
/// Field width in yards
pub const FIELD_WIDTH: f64 = 160.0 / 3.0;

/// Cast the tracking columns to the types the row reader expects
fn typed_tracking_columns() -> [Expr; 11] {
    [
        col("gameId").cast(DataType::Int64),
        col("playId").cast(DataType::Int64),
        col("frameId").cast(DataType::Int64),
        col("nflId").cast(DataType::Int64),
        col("club").cast(DataType::String),
        col("x").cast(DataType::Float64),
        col("y").cast(DataType::Float64),
        col("s").cast(DataType::Float64),
        col("o").cast(DataType::Float64),
        col("dir").cast(DataType::Float64),
        col("event").cast(DataType::String),
    ]
}

/// Rotate an angle in degrees by a half turn
fn rotate_half_turn(angle: Expr) -> Expr {
    (angle + lit(180.0)) % lit(360.0)
}

/// Normalize tracking coordinates to the canonical play direction
///
/// Rows moving `left` are mirrored through the field center and their angles
/// rotated by 180 degrees; `right` rows pass through. Recognized rows are
/// re-tagged as `right`, so a second pass changes nothing. Rows with any
/// other direction keep their raw value and are rejected when materialized.
pub fn normalize_tracking(tracking: LazyFrame) -> LazyFrame {
    let flip = col("playDirection").eq(lit(PlayDirection::Left.as_str()));
    let known = flip
        .clone()
        .or(col("playDirection").eq(lit(PlayDirection::Right.as_str())));

    tracking
        .with_columns(typed_tracking_columns())
        .with_columns([
            when(flip.clone())
                .then(lit(FIELD_LENGTH) - col("x"))
                .otherwise(col("x"))
                .alias("x"),
            when(flip.clone())
                .then(lit(FIELD_WIDTH) - col("y"))
                .otherwise(col("y"))
                .alias("y"),
            when(flip.clone())
                .then(rotate_half_turn(col("dir")))
                .otherwise(col("dir"))
                .alias("dir"),
            when(flip)
                .then(rotate_half_turn(col("o")))
                .otherwise(col("o"))
                .alias("o"),
            when(known)
                .then(lit(PlayDirection::CANONICAL.as_str()))
                .otherwise(col("playDirection"))
                .alias("playDirection"),
        ])
}

/// Fail if any tracking row has a null or unrecognized play direction
pub fn validate_play_direction(tracking: &LazyFrame) -> Result<()> {
    let direction = col("playDirection");
    let bad = tracking
        .clone()
        .filter(
            direction.clone().is_null().or(direction
                .clone()
                .neq(lit(PlayDirection::Left.as_str()))
                .and(direction.neq(lit(PlayDirection::Right.as_str())))),
        )
        .select([col("gameId"), col("playId"), col("playDirection")])
        .limit(1)
        .collect()?;

    if bad.height() > 0 {
        return Err(FeatureError::Schema(format!(
            "tracking rows with unrecognized playDirection, first offender: {}",
            bad
        )));
    }
    Ok(())
}
