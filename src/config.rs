//! Feature extraction configuration
//!
//! The thresholds here are empirical. Defaults reproduce the feature set the
//! downstream model was trained on.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{FeatureError, Result};
use crate::models::{Point, TeamLabel};

/// Rectangle around the line of scrimmage used for the `in_box` count
///
/// Offsets are relative to the LOS. A `None` bound is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRegion {
    pub min_x_offset: Option<f64>,
    pub max_x_offset: Option<f64>,
    pub half_width: f64,
}

impl BoxRegion {
    /// Inclusive on every edge
    pub fn contains(&self, los: Point, x: f64, y: f64) -> bool {
        let above_min = self.min_x_offset.map_or(true, |off| x >= los.x + off);
        let below_max = self.max_x_offset.map_or(true, |off| x <= los.x + off);
        above_min && below_max && (y - los.y).abs() <= self.half_width
    }
}

/// 1-D k-means settings for ordered clustering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub seed: u64,
    /// Independent k-means++ restarts; the lowest-inertia run wins
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            seed: 441,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
        }
    }
}

/// Feature extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Speed above which a player counts as in motion
    pub in_motion_speed: f64,
    pub offense_box: BoxRegion,
    pub defense_box: BoxRegion,
    pub cluster: ClusterConfig,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            in_motion_speed: 0.6,
            offense_box: BoxRegion {
                min_x_offset: Some(-8.0),
                max_x_offset: None,
                half_width: 6.0,
            },
            defense_box: BoxRegion {
                min_x_offset: None,
                max_x_offset: Some(5.0),
                half_width: 4.0,
            },
            cluster: ClusterConfig::default(),
        }
    }
}

impl FeatureConfig {
    /// Load configuration from a JSON file; missing fields keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FeatureError::Schema(format!("cannot read config {:?}: {}", path, e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| FeatureError::Schema(format!("invalid config {:?}: {}", path, e)))
    }

    pub fn box_for(&self, team: TeamLabel) -> Option<&BoxRegion> {
        match team {
            TeamLabel::Offense => Some(&self.offense_box),
            TeamLabel::Defense => Some(&self.defense_box),
            TeamLabel::Football => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FeatureConfig::default();
        assert!((config.in_motion_speed - 0.6).abs() < 1e-12);
        assert_eq!(config.cluster.seed, 441);
        assert_eq!(config.offense_box.min_x_offset, Some(-8.0));
        assert_eq!(config.defense_box.max_x_offset, Some(5.0));
    }

    #[test]
    fn test_offense_box_edges() {
        let config = FeatureConfig::default();
        let los = Point::new(50.0, 20.0);
        let b = config.offense_box;
        assert!(b.contains(los, 42.0, 26.0));
        assert!(b.contains(los, 42.0, 14.0));
        assert!(b.contains(los, 80.0, 20.0));
        assert!(!b.contains(los, 41.9, 20.0));
        assert!(!b.contains(los, 45.0, 26.1));
    }

    #[test]
    fn test_defense_box_edges() {
        let config = FeatureConfig::default();
        let los = Point::new(50.0, 20.0);
        let b = config.defense_box;
        assert!(b.contains(los, 55.0, 24.0));
        assert!(b.contains(los, 10.0, 16.0));
        assert!(!b.contains(los, 55.1, 20.0));
        assert!(!b.contains(los, 52.0, 24.5));
    }

    #[test]
    fn test_box_for_football_is_none() {
        let config = FeatureConfig::default();
        assert!(config.box_for(TeamLabel::Football).is_none());
        assert!(config.box_for(TeamLabel::Offense).is_some());
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"in_motion_speed": 1.5}}"#).unwrap();

        let config = FeatureConfig::load(file.path()).unwrap();
        assert!((config.in_motion_speed - 1.5).abs() < 1e-12);
        assert_eq!(config.cluster, ClusterConfig::default());
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(FeatureConfig::load(file.path()).is_err());
    }
}
