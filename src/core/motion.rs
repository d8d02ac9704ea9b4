//! Motion-Delta Extractor
//!
//! How far a team moved between line-set and the snap, both as net
//! displacement and as path length over the frames in between.

use std::collections::BTreeMap;

use crate::core::segment::AlignedRow;
use crate::features::FeatureVector;
use crate::models::{Point, TeamLabel, TrackingRow};

/// Net displacement summed over a team
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDelta {
    pub team: TeamLabel,
    pub total_x_change: f64,
    pub total_y_change: f64,
    pub total_location_change: f64,
    /// Players present at both events
    pub matched_players: usize,
}

impl MotionDelta {
    pub fn to_features(&self) -> FeatureVector {
        let team = self.team.as_str();
        let mut features = FeatureVector::new();
        features.insert(format!("{}_total_pairwise_x_change", team), self.total_x_change);
        features.insert(format!("{}_total_pairwise_y_change", team), self.total_y_change);
        features.insert(
            format!("{}_total_location_change", team),
            self.total_location_change,
        );
        features
    }
}

/// Keyed by nflId; ordered so sums are identical across runs
fn positions_by_player<'a, I>(rows: I, team: TeamLabel) -> BTreeMap<i64, Point>
where
    I: IntoIterator<Item = &'a TrackingRow>,
{
    rows.into_iter()
        .filter(|r| r.team == team)
        .filter_map(|r| r.nfl_id.map(|id| (id, r.point())))
        .collect()
}

/// Pair each player's line-set and snap positions by nflId
///
/// Rows without an nflId never pair; a player seen at only one event is
/// left out.
pub fn motion_delta(line_set: &[TrackingRow], ball_snap: &[TrackingRow], team: TeamLabel) -> MotionDelta {
    let before = positions_by_player(line_set, team);
    let after = positions_by_player(ball_snap, team);

    let mut delta = MotionDelta {
        team,
        total_x_change: 0.0,
        total_y_change: 0.0,
        total_location_change: 0.0,
        matched_players: 0,
    };
    for (id, start) in &before {
        if let Some(end) = after.get(id) {
            delta.total_x_change += (end.x - start.x).abs();
            delta.total_y_change += (end.y - start.y).abs();
            delta.total_location_change += start.distance(end);
            delta.matched_players += 1;
        }
    }
    delta
}

/// Summed frame-to-frame distance covered by a team from line-set through
/// the snap frame
pub fn path_length_to_snap(aligned: &[AlignedRow<'_>], team: TeamLabel, snap_adjusted_frame: i64) -> f64 {
    let mut tracks: BTreeMap<i64, BTreeMap<i64, Point>> = BTreeMap::new();
    for a in aligned
        .iter()
        .filter(|a| a.row.team == team && a.adjusted_frame_id <= snap_adjusted_frame)
    {
        if let Some(id) = a.row.nfl_id {
            tracks
                .entry(id)
                .or_default()
                .insert(a.adjusted_frame_id, a.row.point());
        }
    }

    tracks
        .values()
        .map(|track| {
            let points: Vec<&Point> = track.values().collect();
            points.windows(2).map(|w| w[0].distance(w[1])).sum::<f64>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::restrict_to_post_line_set;
    use crate::fixtures;

    #[test]
    fn test_offense_motion_delta() {
        let delta = motion_delta(
            &fixtures::frame_rows(2),
            &fixtures::frame_rows(4),
            TeamLabel::Offense,
        );
        assert_eq!(delta.matched_players, 11);
        assert!(delta.total_x_change.abs() < 1e-9);
        assert!((delta.total_y_change - 5.0).abs() < 1e-9);
        assert!((delta.total_location_change - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_stationary_team_is_zero() {
        let delta = motion_delta(
            &fixtures::frame_rows(2),
            &fixtures::frame_rows(4),
            TeamLabel::Defense,
        );
        assert_eq!(delta.total_x_change, 0.0);
        assert_eq!(delta.total_y_change, 0.0);
        assert_eq!(delta.total_location_change, 0.0);
    }

    #[test]
    fn test_ball_never_pairs() {
        let line_set = vec![fixtures::row(2, None, TeamLabel::Football, 50.0, 20.0, 0.0, None)];
        let snap = vec![fixtures::row(4, None, TeamLabel::Football, 52.0, 20.0, 0.0, None)];
        let delta = motion_delta(&line_set, &snap, TeamLabel::Football);
        assert_eq!(delta.matched_players, 0);
        assert_eq!(delta.total_location_change, 0.0);
    }

    #[test]
    fn test_unpaired_player_excluded() {
        let line_set = vec![
            fixtures::row(2, Some(1), TeamLabel::Offense, 10.0, 10.0, 0.0, None),
            fixtures::row(2, Some(2), TeamLabel::Offense, 10.0, 20.0, 0.0, None),
        ];
        let snap = vec![fixtures::row(4, Some(1), TeamLabel::Offense, 13.0, 14.0, 0.0, None)];
        let delta = motion_delta(&line_set, &snap, TeamLabel::Offense);

        assert_eq!(delta.matched_players, 1);
        assert!((delta.total_x_change - 3.0).abs() < 1e-12);
        assert!((delta.total_y_change - 4.0).abs() < 1e-12);
        assert!((delta.total_location_change - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_feature_names() {
        let delta = motion_delta(&[], &[], TeamLabel::Defense);
        let features = delta.to_features();
        assert_eq!(features.len(), 3);
        assert_eq!(features.get("defense_total_pairwise_x_change"), Some(0.0));
    }

    #[test]
    fn test_sums_follow_player_order() {
        // Magnitudes where float addition order shows in the last bits
        let deltas = [1e16, 1.0, -1e16, 1.0, 0.5, 3.0];
        let line_set: Vec<TrackingRow> = (0..deltas.len() as i64)
            .map(|id| fixtures::row(2, Some(id), TeamLabel::Offense, 0.0, 0.0, 0.0, None))
            .collect();
        let snap: Vec<TrackingRow> = deltas
            .iter()
            .enumerate()
            .map(|(id, dx)| fixtures::row(4, Some(id as i64), TeamLabel::Offense, *dx, 0.0, 0.0, None))
            .collect();

        let expected = deltas.iter().fold(0.0, |acc, dx| acc + dx.abs());
        for _ in 0..8 {
            let delta = motion_delta(&line_set, &snap, TeamLabel::Offense);
            assert_eq!(delta.total_x_change.to_bits(), expected.to_bits());
        }

        let reversed: Vec<TrackingRow> = snap.iter().rev().cloned().collect();
        let delta = motion_delta(&line_set, &reversed, TeamLabel::Offense);
        assert_eq!(delta.total_x_change.to_bits(), expected.to_bits());
    }

    #[test]
    fn test_path_length_to_snap() {
        let rows = fixtures::play_rows();
        let aligned = restrict_to_post_line_set(&rows, fixtures::LINE_SET_FRAME);

        let offense = path_length_to_snap(&aligned, TeamLabel::Offense, 3);
        assert!((offense - 5.0).abs() < 1e-9);
        let partial = path_length_to_snap(&aligned, TeamLabel::Offense, 2);
        assert!((partial - 2.5).abs() < 1e-9);
        assert_eq!(path_length_to_snap(&aligned, TeamLabel::Defense, 3), 0.0);
    }
}
