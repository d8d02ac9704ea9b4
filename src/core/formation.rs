//! Formation Feature Extractor
//!
//! Shape descriptors for one team at one instant, all measured in
//! normalized coordinates against the line of scrimmage.

use crate::config::FeatureConfig;
use crate::core::cluster::{ordered_clusters, ClusterSummary};
use crate::core::hull::convex_hull;
use crate::core::segment::FormationSnapshot;
use crate::error::{FeatureError, Result};
use crate::features::FeatureVector;
use crate::models::{Point, TeamLabel};

/// Shape of one team's formation
#[derive(Debug, Clone, PartialEq)]
pub struct FormationFeatures {
    pub team: TeamLabel,
    pub x_centroid: f64,
    /// Mean offset from the LOS; negative means behind it
    pub x_rel_centroid: f64,
    pub y_centroid: f64,
    pub depth: f64,
    pub width: f64,
    pub left_side: usize,
    pub right_side: usize,
    pub in_box: usize,
    pub in_motion: usize,
    pub average_speed: f64,
    pub hull_perimeter: f64,
    pub hull_area: f64,
    /// Clusters of x - los.x, ascending
    pub depth_clusters: Vec<ClusterSummary>,
    /// Clusters of y, ascending
    pub width_clusters: Vec<ClusterSummary>,
}

impl FormationFeatures {
    pub fn to_features(&self) -> FeatureVector {
        let team = self.team.as_str();
        let mut features = FeatureVector::new();
        let mut put = |name: &str, value: f64| features.insert(format!("{}_{}", team, name), value);

        put("x_centroid", self.x_centroid);
        put("x_rel_centroid", self.x_rel_centroid);
        put("y_centroid", self.y_centroid);
        put("depth", self.depth);
        put("width", self.width);
        put("left_side", self.left_side as f64);
        put("right_side", self.right_side as f64);
        put("in_box", self.in_box as f64);
        put("in_motion", self.in_motion as f64);
        put("average_speed", self.average_speed);
        put("hull_perimeter", self.hull_perimeter);
        put("hull_area", self.hull_area);
        for (axis, clusters) in [("depth", &self.depth_clusters), ("width", &self.width_clusters)] {
            for (i, c) in clusters.iter().enumerate() {
                put(&format!("{}_cluster_{}_centroid", axis, i), c.centroid);
                put(&format!("{}_cluster_{}_count", axis, i), c.count as f64);
            }
        }
        features
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn spread(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Compute formation features for one team snapshot
pub fn extract_formation(
    snapshot: &FormationSnapshot<'_>,
    los: Point,
    config: &FeatureConfig,
) -> Result<FormationFeatures> {
    if snapshot.is_empty() {
        return Err(FeatureError::DegenerateFormation(format!(
            "no {} players at {}",
            snapshot.team, snapshot.event
        )));
    }

    let xs: Vec<f64> = snapshot.rows.iter().map(|r| r.x).collect();
    let ys: Vec<f64> = snapshot.rows.iter().map(|r| r.y).collect();
    let x_rel: Vec<f64> = xs.iter().map(|x| x - los.x).collect();
    let speeds: Vec<f64> = snapshot.rows.iter().map(|r| r.s).collect();

    let in_box = match config.box_for(snapshot.team) {
        Some(region) => snapshot
            .rows
            .iter()
            .filter(|r| region.contains(los, r.x, r.y))
            .count(),
        None => 0,
    };

    let hull = convex_hull(&snapshot.points())?;

    Ok(FormationFeatures {
        team: snapshot.team,
        x_centroid: mean(&xs),
        x_rel_centroid: mean(&x_rel),
        y_centroid: mean(&ys),
        depth: spread(&xs),
        width: spread(&ys),
        left_side: ys.iter().filter(|&&y| y <= los.y).count(),
        right_side: ys.iter().filter(|&&y| y >= los.y).count(),
        in_box,
        in_motion: speeds.iter().filter(|&&s| s > config.in_motion_speed).count(),
        average_speed: mean(&speeds),
        hull_perimeter: hull.perimeter(),
        hull_area: hull.area(),
        depth_clusters: ordered_clusters(&x_rel, &config.cluster)?,
        width_clusters: ordered_clusters(&ys, &config.cluster)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, LOS_X, LOS_Y};
    use crate::models::{KeyEvent, TrackingRow};

    fn los() -> Point {
        Point::new(LOS_X, LOS_Y)
    }

    fn extract(team: TeamLabel, frame: i64) -> FormationFeatures {
        let rows = fixtures::frame_rows(frame);
        let snapshot = FormationSnapshot::from_rows(&rows, team, KeyEvent::LineSet);
        extract_formation(&snapshot, los(), &FeatureConfig::default()).unwrap()
    }

    #[test]
    fn test_offense_at_line_set() {
        let f = extract(TeamLabel::Offense, 2);

        let xs = [49.0, 49.0, 49.0, 49.0, 49.0, 45.0, 43.0, 49.0, 49.0, 48.0, 49.0];
        let expected_x = xs.iter().sum::<f64>() / 11.0;
        assert!((f.x_centroid - expected_x).abs() < 1e-9);
        assert!((f.x_rel_centroid - (expected_x - LOS_X)).abs() < 1e-9);
        assert!(f.x_centroid >= 43.0 && f.x_centroid <= 49.0);
        assert!((f.depth - 6.0).abs() < 1e-9);
        assert!((f.width - 42.0).abs() < 1e-9);
        assert_eq!(f.left_side, 6);
        assert_eq!(f.right_side, 8);
        assert_eq!(f.in_box, 7);
        assert_eq!(f.in_motion, 0);
        assert_eq!(f.average_speed, 0.0);
    }

    #[test]
    fn test_defense_at_line_set() {
        let f = extract(TeamLabel::Defense, 2);
        assert_eq!(f.in_box, 5);
        assert!((f.depth - 11.0).abs() < 1e-9);
        assert!(f.x_rel_centroid > 0.0);
    }

    #[test]
    fn test_motion_counted_at_snap() {
        let f = extract(TeamLabel::Offense, 4);
        assert_eq!(f.in_motion, 1);
        assert!((f.average_speed - 2.5 / 11.0).abs() < 1e-9);
        assert_eq!(f.in_box, 7);
    }

    #[test]
    fn test_depth_clusters() {
        let f = extract(TeamLabel::Offense, 2);
        let clusters = &f.depth_clusters;

        // RB at -7, QB at -5, everyone else on the line
        assert_eq!(clusters.len(), 3);
        assert!((clusters[0].centroid + 7.0).abs() < 1e-9);
        assert_eq!(clusters[0].count, 1);
        assert!((clusters[1].centroid + 5.0).abs() < 1e-9);
        assert_eq!(clusters[2].count, 9);
    }

    #[test]
    fn test_feature_names() {
        let features = extract(TeamLabel::Defense, 2).to_features();

        assert_eq!(features.len(), 12 + 2 * 3 * 2);
        assert!(features.get("defense_hull_area").is_some());
        assert!(features.get("defense_depth_cluster_2_count").is_some());
        assert!(features.get("defense_width_cluster_0_centroid").is_some());
        assert!(features.names().all(|n| n.starts_with("defense_")));
    }

    #[test]
    fn test_empty_snapshot_is_degenerate() {
        let rows: Vec<TrackingRow> = Vec::new();
        let snapshot = FormationSnapshot::from_rows(&rows, TeamLabel::Offense, KeyEvent::BallSnap);
        let err = extract_formation(&snapshot, los(), &FeatureConfig::default()).unwrap_err();
        assert!(matches!(err, FeatureError::DegenerateFormation(_)));
    }

    #[test]
    fn test_stacked_formation_is_degenerate() {
        let rows: Vec<TrackingRow> = (0..5)
            .map(|i| {
                fixtures::row(2, Some(100 + i), TeamLabel::Offense, 49.0, 10.0 + i as f64, 0.0, None)
            })
            .collect();
        let snapshot = FormationSnapshot::from_rows(&rows, TeamLabel::Offense, KeyEvent::LineSet);
        assert!(extract_formation(&snapshot, los(), &FeatureConfig::default()).is_err());
    }
}
