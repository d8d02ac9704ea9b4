use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FeatureError;

/// Club code the tracking data uses for the ball
pub const FOOTBALL: &str = "football";

/// Unique identifier for a play: (gameId, playId)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayKey {
    pub game_id: i64,
    pub play_id: i64,
}

impl PlayKey {
    pub fn new(game_id: i64, play_id: i64) -> Self {
        Self { game_id, play_id }
    }
}

impl fmt::Display for PlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.game_id, self.play_id)
    }
}

/// Direction the offense is moving in the raw tracking data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayDirection {
    Left,
    Right,
}

impl PlayDirection {
    /// Direction every play is rewritten to by the normalizer
    pub const CANONICAL: PlayDirection = PlayDirection::Right;

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayDirection::Left => "left",
            PlayDirection::Right => "right",
        }
    }
}

impl FromStr for PlayDirection {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(PlayDirection::Left),
            "right" => Ok(PlayDirection::Right),
            other => Err(FeatureError::Schema(format!(
                "unrecognized playDirection `{}`",
                other
            ))),
        }
    }
}

/// Side a tracked entity belongs to on a given play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamLabel {
    Offense,
    Defense,
    Football,
}

impl TeamLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamLabel::Offense => "offense",
            TeamLabel::Defense => "defense",
            TeamLabel::Football => "football",
        }
    }
}

impl fmt::Display for TeamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamLabel {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offense" => Ok(TeamLabel::Offense),
            "defense" => Ok(TeamLabel::Defense),
            "football" => Ok(TeamLabel::Football),
            other => Err(FeatureError::Schema(format!("unmatched team label `{}`", other))),
        }
    }
}

/// Named tracking events used as per-play anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEvent {
    LineSet,
    BallSnap,
}

impl KeyEvent {
    pub const ALL: [KeyEvent; 2] = [KeyEvent::LineSet, KeyEvent::BallSnap];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyEvent::LineSet => "line_set",
            KeyEvent::BallSnap => "ball_snap",
        }
    }

    pub fn matches(&self, event: Option<&str>) -> bool {
        event == Some(self.as_str())
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field position in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One tracked entity on one frame of one play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRow {
    pub game_id: i64,
    pub play_id: i64,
    pub frame_id: i64,
    /// None for the ball
    pub nfl_id: Option<i64>,
    pub club: String,
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub o: Option<f64>,
    pub dir: Option<f64>,
    pub play_direction: PlayDirection,
    pub event: Option<String>,
    pub team: TeamLabel,
}

impl TrackingRow {
    pub fn key(&self) -> PlayKey {
        PlayKey::new(self.game_id, self.play_id)
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_event(&self, event: KeyEvent) -> bool {
        event.matches(self.event.as_deref())
    }
}

/// Play outcome label for the downstream model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayType {
    Pass,
    Run,
}

impl PlayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayType::Pass => "pass",
            PlayType::Run => "run",
        }
    }
}

/// Play-level game state, one per play key
///
/// Fields that arrive through left joins (games, player-play aggregates) or
/// that the source leaves blank are `Option`; the assembler decides which of
/// them are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayInfo {
    pub key: PlayKey,
    pub quarter: i64,
    pub down: i64,
    pub yards_to_go: i64,
    pub possession_team: String,
    pub defensive_team: String,
    pub game_clock: String,
    pub home_team_abbr: Option<String>,
    pub visitor_team_abbr: Option<String>,
    pub distance_to_endzone: Option<f64>,
    pub possession_team_score: Option<f64>,
    pub defensive_team_score: Option<f64>,
    pub score_difference: Option<f64>,
    pub possession_team_win_probability: Option<f64>,
    pub defensive_team_win_probability: Option<f64>,
    pub quarter_seconds_remaining: f64,
    pub half_seconds_remaining: f64,
    pub game_seconds_remaining: f64,
    pub offense_motion_at_snap_count: Option<f64>,
    pub offense_shift_count: Option<f64>,
    pub is_dropback: Option<bool>,
    pub expected_points_added: Option<f64>,
}

impl PlayInfo {
    pub fn play_type(&self) -> Option<PlayType> {
        self.is_dropback
            .map(|dropback| if dropback { PlayType::Pass } else { PlayType::Run })
    }
}

/// Player-play row joined with the player's bio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPlayRow {
    pub nfl_id: i64,
    pub team_abbr: String,
    pub display_name: Option<String>,
    pub position: Option<String>,
    pub in_motion_at_ball_snap: Option<bool>,
    pub shift_since_line_set: Option<bool>,
    pub motion_since_line_set: Option<bool>,
}
