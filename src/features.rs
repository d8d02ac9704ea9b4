//! Flat feature vectors and the game-state group

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::error::{FeatureError, Result};
use crate::models::PlayInfo;

/// Ordered `name -> value` mapping; values are never null
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>>(&mut self, name: K, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Copy of this vector with every name prefixed
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| (format!("{}{}", prefix, k), *v))
                .collect(),
        )
    }

    /// Add every entry of `other`, overwriting equal names
    pub fn merge(&mut self, other: FeatureVector) {
        self.0.extend(other.0);
    }
}

impl<'a> IntoIterator for &'a FeatureVector {
    type Item = (&'a String, &'a f64);
    type IntoIter = btree_map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn require(info: &PlayInfo, value: Option<f64>, field: &'static str) -> Result<f64> {
    value.ok_or(FeatureError::MissingValue {
        key: info.key,
        field,
    })
}

/// Play-level scalars describing the situation before the snap
///
/// Any null input skips the play rather than being imputed.
pub fn game_state_features(info: &PlayInfo) -> Result<FeatureVector> {
    if info.yards_to_go <= 0 {
        return Err(FeatureError::MissingValue {
            key: info.key,
            field: "yards_to_go",
        });
    }
    let yards_to_go = info.yards_to_go as f64;

    let mut features = FeatureVector::new();
    features.insert("quarter", info.quarter as f64);
    features.insert("down", info.down as f64);
    features.insert("yards_to_go", yards_to_go);
    features.insert("log_yards_to_go", yards_to_go.ln());
    features.insert(
        "distance_to_endzone",
        require(info, info.distance_to_endzone, "distance_to_endzone")?,
    );
    features.insert(
        "score_difference",
        require(info, info.score_difference, "score_difference")?,
    );
    features.insert("game_seconds_remaining", info.game_seconds_remaining);
    features.insert("half_seconds_remaining", info.half_seconds_remaining);
    features.insert(
        "possession_team_win_probability",
        require(
            info,
            info.possession_team_win_probability,
            "possession_team_win_probability",
        )?,
    );
    features.insert(
        "offense_motion_at_snap_count",
        require(
            info,
            info.offense_motion_at_snap_count,
            "offense_motion_at_snap_count",
        )?,
    );
    features.insert(
        "offense_shift_count",
        require(info, info.offense_shift_count, "offense_shift_count")?,
    );
    Ok(features)
}
