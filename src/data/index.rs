//! Play Index
//!
//! Joins tracking, plays, and player-play tables and answers per-play
//! lookups. Everything is materialized in one pass at build time: the plays
//! table, the player-play rows, the two anchor-event snapshots, and each
//! play's frames from line-set through the snap. Per-play lookups never
//! touch the input files again.

use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::data::loader::RawTables;
use crate::data::normalize::{normalize_tracking, validate_play_direction};
use crate::data::plays::{engineer_plays, play_infos_from_frame, with_key_types};
use crate::error::{FeatureError, Result};
use crate::models::{
    KeyEvent, PlayDirection, PlayInfo, PlayKey, PlayerPlayRow, TeamLabel, TrackingRow, FOOTBALL,
};

/// Label written for clubs that match neither team; rejected on read
const UNMATCHED_TEAM: &str = "unmatched";

/// Everything known about one play
#[derive(Debug, Clone)]
pub struct PlayData {
    pub info: PlayInfo,
    /// Frames from the first `line_set` through the first `ball_snap`,
    /// sorted by frameId; empty unless both events exist in that order
    pub tracking: Vec<TrackingRow>,
    /// Rows on the first `line_set` frame; empty if the play has none
    pub line_set: Vec<TrackingRow>,
    /// Rows on the first `ball_snap` frame; empty if the play has none
    pub ball_snap: Vec<TrackingRow>,
    pub player_plays: Vec<PlayerPlayRow>,
}

impl PlayData {
    pub fn key(&self) -> PlayKey {
        self.info.key
    }

    pub fn snapshot(&self, event: KeyEvent) -> &[TrackingRow] {
        match event {
            KeyEvent::LineSet => &self.line_set,
            KeyEvent::BallSnap => &self.ball_snap,
        }
    }
}

/// Indexed play data with O(1) lookups
pub struct PlayIndex {
    plays: HashMap<PlayKey, PlayInfo>,
    /// All play keys in sorted order
    keys: Vec<PlayKey>,
    line_set: HashMap<PlayKey, Vec<TrackingRow>>,
    ball_snap: HashMap<PlayKey, Vec<TrackingRow>>,
    /// Normalized, team-labelled rows from line-set through the snap
    pre_snap: HashMap<PlayKey, Vec<TrackingRow>>,
    /// Player-play rows joined with player bios
    player_plays: HashMap<PlayKey, Vec<PlayerPlayRow>>,
}

impl PlayIndex {
    /// Build the index from the raw tables
    ///
    /// Fails with a schema error on an unrecognized play direction, a
    /// duplicate play row, or a tracking club that matches neither team.
    /// Tracking rows of plays missing from the plays table are dropped.
    pub fn new(tables: RawTables) -> Result<Self> {
        let RawTables {
            games,
            plays,
            players,
            player_plays,
            tracking,
        } = tables;

        if tracking.is_empty() {
            return Err(FeatureError::Schema("no tracking tables supplied".to_string()));
        }
        let tracking = concat(tracking, UnionArgs::default())?;
        validate_play_direction(&tracking)?;

        let player_plays =
            with_key_types(player_plays).with_columns([col("nflId").cast(DataType::Int64)]);

        let plays_df =
            engineer_plays(with_key_types(plays), games, player_plays.clone()).collect()?;
        let mut play_map = HashMap::with_capacity(plays_df.height());
        for info in play_infos_from_frame(&plays_df)? {
            let key = info.key;
            if play_map.insert(key, info).is_some() {
                return Err(FeatureError::Schema(format!(
                    "more than one plays row for play {}",
                    key
                )));
            }
        }
        let mut keys: Vec<PlayKey> = play_map.keys().copied().collect();
        keys.sort();

        let teams = plays_df.lazy().select([
            col("gameId"),
            col("playId"),
            col("possessionTeam"),
            col("defensiveTeam"),
        ]);
        let tracking = label_teams(normalize_tracking(tracking), teams);

        let players = players.select([
            col("nflId").cast(DataType::Int64),
            col("displayName").cast(DataType::String),
            col("position").cast(DataType::String),
        ]);
        let player_plays = player_plays.join(
            players,
            [col("nflId")],
            [col("nflId")],
            JoinArgs::new(JoinType::Left),
        );

        let player_play_df = player_plays.collect()?;
        let player_plays = player_plays_by_play(&player_play_df)?;

        let tracking_df = anchor_and_pre_snap_rows(tracking).collect()?;
        let tracking_rows = tracking_rows_from_frame(&tracking_df)?;
        let line_set = first_frame_snapshots(&tracking_rows, KeyEvent::LineSet);
        let ball_snap = first_frame_snapshots(&tracking_rows, KeyEvent::BallSnap);
        let pre_snap = pre_snap_windows(tracking_rows, &line_set, &ball_snap);

        info!(
            "Indexed {} plays ({} with line_set, {} with ball_snap, {} pre-snap windows)",
            keys.len(),
            line_set.len(),
            ball_snap.len(),
            pre_snap.len()
        );

        Ok(Self {
            plays: play_map,
            keys,
            line_set,
            ball_snap,
            pre_snap,
            player_plays,
        })
    }

    /// All play keys in sorted order
    pub fn play_keys(&self) -> &[PlayKey] {
        &self.keys
    }

    pub fn play_info(&self, key: PlayKey) -> Option<&PlayInfo> {
        self.plays.get(&key)
    }

    /// Cached rows at the first frame tagged with `event` - O(1)
    pub fn anchor_snapshot(&self, key: PlayKey, event: KeyEvent) -> &[TrackingRow] {
        let cache = match event {
            KeyEvent::LineSet => &self.line_set,
            KeyEvent::BallSnap => &self.ball_snap,
        };
        cache.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Gather all data for one play from the in-memory caches
    pub fn play_data(&self, key: PlayKey) -> Result<PlayData> {
        let info = self
            .plays
            .get(&key)
            .cloned()
            .ok_or(FeatureError::UnknownPlay(key))?;

        let tracking = self.pre_snap.get(&key).cloned().unwrap_or_default();
        let player_plays = self.player_plays.get(&key).cloned().unwrap_or_default();

        debug!(
            "Play {}: {} pre-snap rows, {} player-play rows",
            key,
            tracking.len(),
            player_plays.len()
        );

        Ok(PlayData {
            info,
            tracking,
            line_set: self.anchor_snapshot(key, KeyEvent::LineSet).to_vec(),
            ball_snap: self.anchor_snapshot(key, KeyEvent::BallSnap).to_vec(),
            player_plays,
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn first_frame_of(event: KeyEvent) -> Expr {
    col("frameId")
        .filter(col("event").eq(lit(event.as_str())))
        .min()
}

/// Rows tagged with an anchor event plus every row between a play's first
/// `line_set` and first `ball_snap` frames
fn anchor_and_pre_snap_rows(tracking: LazyFrame) -> LazyFrame {
    let keys = [col("gameId"), col("playId")];
    let bounds = tracking.clone().group_by(keys.clone()).agg([
        first_frame_of(KeyEvent::LineSet).alias("lineSetFrame"),
        first_frame_of(KeyEvent::BallSnap).alias("ballSnapFrame"),
    ]);

    let is_anchor = col("event")
        .eq(lit(KeyEvent::LineSet.as_str()))
        .or(col("event").eq(lit(KeyEvent::BallSnap.as_str())));
    // Null bounds compare to null, so plays missing an event keep only tagged rows
    let in_window = col("frameId")
        .gt_eq(col("lineSetFrame"))
        .and(col("frameId").lt_eq(col("ballSnapFrame")));

    tracking
        .join(bounds, keys.clone(), keys, JoinArgs::new(JoinType::Inner))
        .filter(is_anchor.or(in_window))
        .drop(["lineSetFrame", "ballSnapFrame"])
}

/// Attach the offense/defense/football label to every tracking row
fn label_teams(tracking: LazyFrame, teams: LazyFrame) -> LazyFrame {
    tracking
        .join(
            teams,
            [col("gameId"), col("playId")],
            [col("gameId"), col("playId")],
            JoinArgs::new(JoinType::Inner),
        )
        .with_columns([when(col("club").eq(lit(FOOTBALL)))
            .then(lit(TeamLabel::Football.as_str()))
            .when(col("club").eq(col("possessionTeam")))
            .then(lit(TeamLabel::Offense.as_str()))
            .when(col("club").eq(col("defensiveTeam")))
            .then(lit(TeamLabel::Defense.as_str()))
            .otherwise(lit(UNMATCHED_TEAM))
            .alias("team")])
        .drop(["possessionTeam", "defensiveTeam"])
}

/// Keep, per play, only the rows on the first frame tagged with `event`
fn first_frame_snapshots(
    rows: &[TrackingRow],
    event: KeyEvent,
) -> HashMap<PlayKey, Vec<TrackingRow>> {
    let mut by_play: HashMap<PlayKey, Vec<TrackingRow>> = HashMap::new();
    for row in rows.iter().filter(|r| r.is_event(event)) {
        by_play.entry(row.key()).or_default().push(row.clone());
    }

    for snapshot in by_play.values_mut() {
        if let Some(first) = snapshot.iter().map(|r| r.frame_id).min() {
            snapshot.retain(|r| r.frame_id == first);
        }
    }

    by_play
}

/// Per play, the rows from the line-set snapshot's frame through the snap
/// snapshot's frame, sorted by frameId
///
/// A play without both snapshots, or with the snap before the line set,
/// gets no window.
fn pre_snap_windows(
    rows: Vec<TrackingRow>,
    line_set: &HashMap<PlayKey, Vec<TrackingRow>>,
    ball_snap: &HashMap<PlayKey, Vec<TrackingRow>>,
) -> HashMap<PlayKey, Vec<TrackingRow>> {
    let frame_of = |cache: &HashMap<PlayKey, Vec<TrackingRow>>, key: &PlayKey| {
        cache.get(key).and_then(|rows| rows.first()).map(|r| r.frame_id)
    };

    let mut windows: HashMap<PlayKey, Vec<TrackingRow>> = HashMap::new();
    for row in rows {
        let key = row.key();
        if let (Some(start), Some(end)) = (frame_of(line_set, &key), frame_of(ball_snap, &key)) {
            if start <= row.frame_id && row.frame_id <= end {
                windows.entry(key).or_default().push(row);
            }
        }
    }

    for window in windows.values_mut() {
        window.sort_by_key(|r| r.frame_id);
    }
    windows
}

fn schema_null(column: &str, row: usize) -> FeatureError {
    FeatureError::Schema(format!("null `{}` in tracking row {}", column, row))
}

/// Convert a normalized, labelled tracking frame into rows
pub fn tracking_rows_from_frame(df: &DataFrame) -> Result<Vec<TrackingRow>> {
    let mut rows = Vec::with_capacity(df.height());

    let game_col = df.column("gameId")?.i64()?;
    let play_col = df.column("playId")?.i64()?;
    let frame_col = df.column("frameId")?.i64()?;
    let nfl_col = df.column("nflId")?.i64()?;
    let club_col = df.column("club")?.str()?;
    let x_col = df.column("x")?.f64()?;
    let y_col = df.column("y")?.f64()?;
    let s_col = df.column("s")?.f64()?;
    let o_col = df.column("o")?.f64()?;
    let dir_col = df.column("dir")?.f64()?;
    let direction_col = df.column("playDirection")?.str()?;
    let event_col = df.column("event")?.str()?;
    let team_col = df.column("team")?.str()?;

    for i in 0..df.height() {
        let club = club_col.get(i).ok_or_else(|| schema_null("club", i))?;
        let team = team_col
            .get(i)
            .ok_or_else(|| schema_null("team", i))?
            .parse::<TeamLabel>()
            .map_err(|_| {
                FeatureError::Schema(format!(
                    "club `{}` matches neither team on play {}-{}",
                    club,
                    game_col.get(i).unwrap_or_default(),
                    play_col.get(i).unwrap_or_default()
                ))
            })?;
        let play_direction = direction_col
            .get(i)
            .ok_or_else(|| schema_null("playDirection", i))?
            .parse::<PlayDirection>()?;

        rows.push(TrackingRow {
            game_id: game_col.get(i).ok_or_else(|| schema_null("gameId", i))?,
            play_id: play_col.get(i).ok_or_else(|| schema_null("playId", i))?,
            frame_id: frame_col.get(i).ok_or_else(|| schema_null("frameId", i))?,
            nfl_id: nfl_col.get(i),
            club: club.to_string(),
            x: x_col.get(i).ok_or_else(|| schema_null("x", i))?,
            y: y_col.get(i).ok_or_else(|| schema_null("y", i))?,
            s: s_col.get(i).ok_or_else(|| schema_null("s", i))?,
            o: o_col.get(i),
            dir: dir_col.get(i),
            play_direction,
            event: event_col.get(i).map(str::to_string),
            team,
        });
    }

    Ok(rows)
}

/// Player-play rows grouped by play, in table order
fn player_plays_by_play(df: &DataFrame) -> Result<HashMap<PlayKey, Vec<PlayerPlayRow>>> {
    let mut by_play: HashMap<PlayKey, Vec<PlayerPlayRow>> = HashMap::new();

    let game_col = df.column("gameId")?.i64()?;
    let play_col = df.column("playId")?.i64()?;
    let nfl_col = df.column("nflId")?.i64()?;
    let team_col = df.column("teamAbbr")?.str()?;
    let name_col = df.column("displayName")?.str()?;
    let position_col = df.column("position")?.str()?;
    let motion_snap_col = df.column("inMotionAtBallSnap")?.cast(&DataType::Boolean)?;
    let shift_col = df.column("shiftSinceLineset")?.cast(&DataType::Boolean)?;
    let motion_col = df.column("motionSinceLineset")?.cast(&DataType::Boolean)?;
    let motion_snap_col = motion_snap_col.bool()?;
    let shift_col = shift_col.bool()?;
    let motion_col = motion_col.bool()?;

    let null = |column: &str, i: usize| {
        FeatureError::Schema(format!("null `{}` in player-play row {}", column, i))
    };

    for i in 0..df.height() {
        let key = PlayKey::new(
            game_col.get(i).ok_or_else(|| null("gameId", i))?,
            play_col.get(i).ok_or_else(|| null("playId", i))?,
        );
        by_play.entry(key).or_default().push(PlayerPlayRow {
            nfl_id: nfl_col.get(i).ok_or_else(|| null("nflId", i))?,
            team_abbr: team_col.get(i).unwrap_or_default().to_string(),
            display_name: name_col.get(i).map(str::to_string),
            position: position_col.get(i).map(str::to_string),
            in_motion_at_ball_snap: motion_snap_col.get(i),
            shift_since_line_set: shift_col.get(i),
            motion_since_line_set: motion_col.get(i),
        });
    }

    Ok(by_play)
}
