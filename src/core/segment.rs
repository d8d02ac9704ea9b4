//! Play Segmenter
//!
//! Per-play anchors: line of scrimmage, first-down marker, key-event frames,
//! and the view of the play from line-set onward.

use crate::core::zones::ZoneGrid;
use crate::data::PlayData;
use crate::error::{FeatureError, Result};
use crate::models::{KeyEvent, PlayInfo, PlayKey, PlayerPlayRow, Point, TeamLabel, TrackingRow};

/// First frame tagged with each anchor event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFrames {
    pub line_set: i64,
    pub ball_snap: i64,
}

impl KeyFrames {
    pub fn frame(&self, event: KeyEvent) -> i64 {
        match event {
            KeyEvent::LineSet => self.line_set,
            KeyEvent::BallSnap => self.ball_snap,
        }
    }

    /// Frames elapsed from line-set to snap
    pub fn frames_to_snap(&self) -> i64 {
        self.ball_snap - self.line_set
    }

    /// Snap frame on the post-line-set clock, where line-set is frame 1
    pub fn adjusted_snap_frame(&self) -> i64 {
        self.frames_to_snap() + 1
    }
}

/// Lowest frameId tagged with `event`
pub fn first_event_frame(key: PlayKey, rows: &[TrackingRow], event: KeyEvent) -> Result<i64> {
    rows.iter()
        .filter(|r| r.is_event(event))
        .map(|r| r.frame_id)
        .min()
        .ok_or(FeatureError::MissingEvent { key, event })
}

/// The ball's position on the first `line_set` frame
pub fn locate_line_of_scrimmage(key: PlayKey, rows: &[TrackingRow]) -> Result<Point> {
    let frame_id = first_event_frame(key, rows, KeyEvent::LineSet)?;
    rows.iter()
        .find(|r| r.frame_id == frame_id && r.team == TeamLabel::Football)
        .map(TrackingRow::point)
        .ok_or(FeatureError::MissingBall { key, frame_id })
}

/// Plays run toward increasing x, so the marker sits downfield of the LOS
pub fn locate_first_down_marker(los: Point, yards_to_go: i64) -> f64 {
    los.x + yards_to_go as f64
}

/// First `line_set` and `ball_snap` frames
///
/// A snap tagged before the line set counts as a missing snap.
pub fn key_event_frames(key: PlayKey, rows: &[TrackingRow]) -> Result<KeyFrames> {
    anchor_key_frames(key, rows, rows)
}

/// Key frames read from separate line-set and snap row sets
pub fn anchor_key_frames(
    key: PlayKey,
    line_set: &[TrackingRow],
    ball_snap: &[TrackingRow],
) -> Result<KeyFrames> {
    let line_set = first_event_frame(key, line_set, KeyEvent::LineSet)?;
    let ball_snap = first_event_frame(key, ball_snap, KeyEvent::BallSnap)?;
    if ball_snap < line_set {
        return Err(FeatureError::MissingEvent {
            key,
            event: KeyEvent::BallSnap,
        });
    }
    Ok(KeyFrames {
        line_set,
        ball_snap,
    })
}

/// A tracking row on the post-line-set clock
#[derive(Debug, Clone, Copy)]
pub struct AlignedRow<'a> {
    pub row: &'a TrackingRow,
    /// 1 on the line-set frame
    pub adjusted_frame_id: i64,
}

/// Drop everything before line-set and renumber frames from 1
pub fn restrict_to_post_line_set(rows: &[TrackingRow], line_set_frame: i64) -> Vec<AlignedRow<'_>> {
    rows.iter()
        .filter(|r| r.frame_id >= line_set_frame)
        .map(|row| AlignedRow {
            row,
            adjusted_frame_id: row.frame_id - line_set_frame + 1,
        })
        .collect()
}

/// One team's rows at one anchor event
#[derive(Debug, Clone)]
pub struct FormationSnapshot<'a> {
    pub team: TeamLabel,
    pub event: KeyEvent,
    pub rows: Vec<&'a TrackingRow>,
}

impl<'a> FormationSnapshot<'a> {
    pub fn from_rows(rows: &'a [TrackingRow], team: TeamLabel, event: KeyEvent) -> Self {
        Self {
            team,
            event,
            rows: rows.iter().filter(|r| r.team == team).collect(),
        }
    }

    pub fn points(&self) -> Vec<Point> {
        self.rows.iter().map(|r| r.point()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the feature extractors need about one play
///
/// Built once per play key and never mutated.
#[derive(Debug, Clone)]
pub struct ParsedPlay {
    pub info: PlayInfo,
    /// Line-set through snap
    pub tracking: Vec<TrackingRow>,
    pub line_set: Vec<TrackingRow>,
    pub ball_snap: Vec<TrackingRow>,
    pub player_plays: Vec<PlayerPlayRow>,
    pub los: Point,
    pub first_down_x: f64,
    pub key_frames: KeyFrames,
}

impl ParsedPlay {
    pub fn build(data: PlayData) -> Result<Self> {
        let key = data.key();
        let los = locate_line_of_scrimmage(key, &data.line_set)?;
        let key_frames = anchor_key_frames(key, &data.line_set, &data.ball_snap)?;
        let first_down_x = locate_first_down_marker(los, data.info.yards_to_go);

        Ok(Self {
            info: data.info,
            tracking: data.tracking,
            line_set: data.line_set,
            ball_snap: data.ball_snap,
            player_plays: data.player_plays,
            los,
            first_down_x,
            key_frames,
        })
    }

    pub fn key(&self) -> PlayKey {
        self.info.key
    }

    pub fn anchor_rows(&self, event: KeyEvent) -> &[TrackingRow] {
        match event {
            KeyEvent::LineSet => &self.line_set,
            KeyEvent::BallSnap => &self.ball_snap,
        }
    }

    pub fn snapshot(&self, team: TeamLabel, event: KeyEvent) -> FormationSnapshot<'_> {
        FormationSnapshot::from_rows(self.anchor_rows(event), team, event)
    }

    pub fn post_line_set(&self) -> Vec<AlignedRow<'_>> {
        restrict_to_post_line_set(&self.tracking, self.key_frames.line_set)
    }

    pub fn zone_grid(&self) -> ZoneGrid {
        ZoneGrid::new(self.los, self.first_down_x)
    }
}
