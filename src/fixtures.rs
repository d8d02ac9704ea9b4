//! Shared in-memory test data
//!
//! One synthetic game, KC (home, offense) against BUF. Every play uses the
//! same formation: the ball at (50, 80/6) with frames
//! 1 (pre-set), 2 (`line_set`), 3 (motion), 4 (`ball_snap`).
//! Receiver 110 motions 5 yards toward the ball between line-set and snap.

use polars::prelude::*;

use crate::data::loader::RawTables;
use crate::data::normalize::{FIELD_LENGTH, FIELD_WIDTH};
use crate::models::{PlayDirection, PlayInfo, PlayKey, TeamLabel, TrackingRow, FOOTBALL};

pub const GAME_ID: i64 = 2022091200;
pub const OFFENSE_CLUB: &str = "KC";
pub const DEFENSE_CLUB: &str = "BUF";
pub const LOS_X: f64 = 50.0;
pub const LOS_Y: f64 = 80.0 / 6.0;
pub const YARDS_TO_GO: i64 = 10;
pub const MOVING_RECEIVER: i64 = 110;
pub const LINE_SET_FRAME: i64 = 2;
pub const BALL_SNAP_FRAME: i64 = 4;
const FRAMES: i64 = 4;
const HEADING: f64 = 90.0;

/// Which play to synthesize and how it was recorded
#[derive(Debug, Clone, Copy)]
pub struct PlaySpec {
    pub play_id: i64,
    pub direction: &'static str,
    pub line_set: bool,
    pub ball_snap: bool,
}

impl PlaySpec {
    pub fn right(play_id: i64) -> Self {
        Self {
            play_id,
            direction: "right",
            line_set: true,
            ball_snap: true,
        }
    }

    /// Same play recorded with the offense moving left, stored mirrored
    pub fn left(play_id: i64) -> Self {
        Self {
            direction: "left",
            ..Self::right(play_id)
        }
    }

    pub fn without_snap(self) -> Self {
        Self {
            ball_snap: false,
            ..self
        }
    }

    pub fn without_line_set(self) -> Self {
        Self {
            line_set: false,
            ..self
        }
    }
}

pub fn key(play_id: i64) -> PlayKey {
    PlayKey::new(GAME_ID, play_id)
}

/// (nflId, team, x, y, speed) in canonical orientation
type Entity = (Option<i64>, TeamLabel, f64, f64, f64);

fn offense_line_set() -> Vec<(i64, &'static str, f64, f64)> {
    vec![
        (101, "T", 49.0, LOS_Y - 4.0),
        (102, "G", 49.0, LOS_Y - 2.0),
        (103, "C", 49.0, LOS_Y),
        (104, "G", 49.0, LOS_Y + 2.0),
        (105, "T", 49.0, LOS_Y + 4.0),
        (106, "QB", 45.0, LOS_Y),
        (107, "RB", 43.0, LOS_Y),
        (108, "TE", 49.0, LOS_Y + 6.5),
        (109, "WR", 49.0, 3.0),
        (MOVING_RECEIVER, "WR", 48.0, 25.0),
        (111, "WR", 49.0, 45.0),
    ]
}

fn defense_line_set() -> Vec<(i64, &'static str, f64, f64)> {
    vec![
        (201, "DE", 51.0, LOS_Y - 3.0),
        (202, "DT", 51.0, LOS_Y - 1.0),
        (203, "DT", 51.0, LOS_Y + 1.0),
        (204, "DE", 51.0, LOS_Y + 3.0),
        (205, "OLB", 55.0, LOS_Y - 4.5),
        (206, "ILB", 55.0, LOS_Y),
        (207, "OLB", 55.0, LOS_Y + 4.5),
        (208, "CB", 52.0, 3.0),
        (209, "CB", 52.0, 45.0),
        (210, "FS", 62.0, LOS_Y - 6.0),
        (211, "SS", 62.0, LOS_Y + 6.0),
    ]
}

fn moving_receiver_y(frame_id: i64) -> (f64, f64) {
    match frame_id {
        3 => (22.5, 2.5),
        4 => (20.0, 2.5),
        _ => (25.0, 0.0),
    }
}

/// Every tracked entity on one frame, canonical orientation
fn entities(frame_id: i64) -> Vec<Entity> {
    let mut out = Vec::with_capacity(23);
    for (id, _, x, y) in offense_line_set() {
        if id == MOVING_RECEIVER {
            let (y, s) = moving_receiver_y(frame_id);
            out.push((Some(id), TeamLabel::Offense, x, y, s));
        } else {
            out.push((Some(id), TeamLabel::Offense, x, y, 0.0));
        }
    }
    for (id, _, x, y) in defense_line_set() {
        out.push((Some(id), TeamLabel::Defense, x, y, 0.0));
    }
    out.push((None, TeamLabel::Football, LOS_X, LOS_Y, 0.0));
    out
}

fn event_at(play: &PlaySpec, frame_id: i64) -> Option<&'static str> {
    match frame_id {
        LINE_SET_FRAME if play.line_set => Some("line_set"),
        BALL_SNAP_FRAME if play.ball_snap => Some("ball_snap"),
        _ => None,
    }
}

fn club_for(team: TeamLabel) -> &'static str {
    match team {
        TeamLabel::Offense => OFFENSE_CLUB,
        TeamLabel::Defense => DEFENSE_CLUB,
        TeamLabel::Football => FOOTBALL,
    }
}

/// A canonical-orientation row on play 1
pub fn row(
    frame_id: i64,
    nfl_id: Option<i64>,
    team: TeamLabel,
    x: f64,
    y: f64,
    s: f64,
    event: Option<&str>,
) -> TrackingRow {
    TrackingRow {
        game_id: GAME_ID,
        play_id: 1,
        frame_id,
        nfl_id,
        club: club_for(team).to_string(),
        x,
        y,
        s,
        o: Some(HEADING),
        dir: Some(HEADING),
        play_direction: PlayDirection::Right,
        event: event.map(str::to_string),
        team,
    }
}

/// Canonical rows of play 1 on one frame, all entities
pub fn frame_rows(frame_id: i64) -> Vec<TrackingRow> {
    let play = PlaySpec::right(1);
    entities(frame_id)
        .into_iter()
        .map(|(id, team, x, y, s)| row(frame_id, id, team, x, y, s, event_at(&play, frame_id)))
        .collect()
}

/// Canonical rows of play 1 for all frames, sorted by frame
pub fn play_rows() -> Vec<TrackingRow> {
    (1..=FRAMES).flat_map(frame_rows).collect()
}

/// One team's rows on one frame
pub fn team_rows(team: TeamLabel, frame_id: i64) -> Vec<TrackingRow> {
    frame_rows(frame_id)
        .into_iter()
        .filter(|r| r.team == team)
        .collect()
}

/// Raw tracking table for one play as it would be read from disk
pub fn tracking_frame(play: PlaySpec) -> DataFrame {
    let mirror = play.direction == "left";
    let mut frame_ids = Vec::new();
    let mut nfl_ids = Vec::new();
    let mut clubs = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut speeds = Vec::new();
    let mut angles = Vec::new();
    let mut events = Vec::new();

    for frame_id in 1..=FRAMES {
        for (id, team, x, y, s) in entities(frame_id) {
            frame_ids.push(frame_id);
            nfl_ids.push(id);
            clubs.push(club_for(team));
            if mirror {
                xs.push(FIELD_LENGTH - x);
                ys.push(FIELD_WIDTH - y);
                angles.push((HEADING + 180.0) % 360.0);
            } else {
                xs.push(x);
                ys.push(y);
                angles.push(HEADING);
            }
            speeds.push(s);
            events.push(event_at(&play, frame_id));
        }
    }

    let n = frame_ids.len();
    df! {
        "gameId" => vec![GAME_ID; n],
        "playId" => vec![play.play_id; n],
        "nflId" => nfl_ids,
        "frameId" => frame_ids,
        "club" => clubs,
        "playDirection" => vec![play.direction; n],
        "x" => xs,
        "y" => ys,
        "s" => speeds,
        "o" => angles.clone(),
        "dir" => angles,
        "event" => events,
    }
    .unwrap()
}

pub fn games_frame() -> DataFrame {
    df! {
        "gameId" => [GAME_ID],
        "season" => [2022i64],
        "week" => [1i64],
        "homeTeamAbbr" => [OFFENSE_CLUB],
        "visitorTeamAbbr" => [DEFENSE_CLUB],
    }
    .unwrap()
}

/// Raw plays rows; KC ball on its own 40, 3rd and 10, 5:30 left in Q2
pub fn plays_frame(play_ids: &[i64]) -> DataFrame {
    let n = play_ids.len();
    df! {
        "gameId" => vec![GAME_ID; n],
        "playId" => play_ids.to_vec(),
        "quarter" => vec![2i64; n],
        "down" => vec![3i64; n],
        "yardsToGo" => vec![YARDS_TO_GO; n],
        "possessionTeam" => vec![OFFENSE_CLUB; n],
        "defensiveTeam" => vec![DEFENSE_CLUB; n],
        "yardlineSide" => vec![OFFENSE_CLUB; n],
        "yardlineNumber" => vec![40i64; n],
        "gameClock" => vec!["05:30"; n],
        "preSnapHomeScore" => vec![14i64; n],
        "preSnapVisitorScore" => vec![10i64; n],
        "preSnapHomeTeamWinProbability" => vec![0.6f64; n],
        "preSnapVisitorTeamWinProbability" => vec![0.4f64; n],
        "isDropback" => vec![true; n],
        "expectedPointsAdded" => vec![0.35f64; n],
    }
    .unwrap()
}

pub fn players_frame() -> DataFrame {
    let (ids, positions): (Vec<i64>, Vec<&str>) = offense_line_set()
        .into_iter()
        .chain(defense_line_set())
        .map(|(id, position, _, _)| (id, position))
        .unzip();
    let names: Vec<String> = ids.iter().map(|id| format!("Player {}", id)).collect();
    df! {
        "nflId" => ids,
        "displayName" => names,
        "position" => positions,
    }
    .unwrap()
}

pub fn player_play_frame(play_ids: &[i64]) -> DataFrame {
    let mut game_ids = Vec::new();
    let mut plays = Vec::new();
    let mut nfl_ids = Vec::new();
    let mut teams = Vec::new();
    let mut in_motion = Vec::new();
    let mut shifted = Vec::new();
    let mut motioned = Vec::new();

    for &play_id in play_ids {
        let roster = offense_line_set()
            .into_iter()
            .map(|p| (p.0, OFFENSE_CLUB))
            .chain(defense_line_set().into_iter().map(|p| (p.0, DEFENSE_CLUB)));
        for (id, club) in roster {
            game_ids.push(GAME_ID);
            plays.push(play_id);
            nfl_ids.push(id);
            teams.push(club);
            in_motion.push(id == MOVING_RECEIVER);
            shifted.push(false);
            motioned.push(id == MOVING_RECEIVER);
        }
    }

    df! {
        "gameId" => game_ids,
        "playId" => plays,
        "nflId" => nfl_ids,
        "teamAbbr" => teams,
        "inMotionAtBallSnap" => in_motion,
        "shiftSinceLineset" => shifted,
        "motionSinceLineset" => motioned,
    }
    .unwrap()
}

/// Complete input tables, one tracking table per play
pub fn raw_tables(plays: &[PlaySpec]) -> RawTables {
    let play_ids: Vec<i64> = plays.iter().map(|s| s.play_id).collect();
    RawTables {
        games: games_frame().lazy(),
        plays: plays_frame(&play_ids).lazy(),
        players: players_frame().lazy(),
        player_plays: player_play_frame(&play_ids).lazy(),
        tracking: plays.iter().map(|s| tracking_frame(*s).lazy()).collect(),
    }
}

/// The PlayInfo the index builds for any fixture play
pub fn play_info() -> PlayInfo {
    PlayInfo {
        key: key(1),
        quarter: 2,
        down: 3,
        yards_to_go: YARDS_TO_GO,
        possession_team: OFFENSE_CLUB.to_string(),
        defensive_team: DEFENSE_CLUB.to_string(),
        game_clock: "05:30".to_string(),
        home_team_abbr: Some(OFFENSE_CLUB.to_string()),
        visitor_team_abbr: Some(DEFENSE_CLUB.to_string()),
        distance_to_endzone: Some(60.0),
        possession_team_score: Some(14.0),
        defensive_team_score: Some(10.0),
        score_difference: Some(4.0),
        possession_team_win_probability: Some(0.6),
        defensive_team_win_probability: Some(0.4),
        quarter_seconds_remaining: 330.0,
        half_seconds_remaining: 330.0,
        game_seconds_remaining: 2130.0,
        offense_motion_at_snap_count: Some(1.0),
        offense_shift_count: Some(0.0),
        is_dropback: Some(true),
        expected_points_added: Some(0.35),
    }
}
