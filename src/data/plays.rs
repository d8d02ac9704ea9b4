//! Play table engineering
//!
//! Joins games and player-play aggregates onto plays and derives the
//! possession-relative game state the feature vector is built from.

use polars::prelude::*;

use crate::error::{FeatureError, Result};
use crate::models::{PlayInfo, PlayKey};

const QUARTER_SECONDS: f64 = 900.0;
const REGULATION_QUARTERS: i64 = 4;

/// Cast the play key columns so joins line up across tables
pub fn with_key_types(frame: LazyFrame) -> LazyFrame {
    frame.with_columns([
        col("gameId").cast(DataType::Int64),
        col("playId").cast(DataType::Int64),
    ])
}

/// Per (gameId, playId, teamAbbr) motion counts from the player-play table
fn team_motion_aggregates(player_plays: LazyFrame) -> LazyFrame {
    player_plays
        .group_by([col("gameId"), col("playId"), col("teamAbbr")])
        .agg([
            col("inMotionAtBallSnap")
                .cast(DataType::Int64)
                .sum()
                .alias("offenseMotionAtSnapCount"),
            col("shiftSinceLineset")
                .cast(DataType::Int64)
                .sum()
                .alias("offenseShiftCount"),
        ])
}

/// Build the engineered plays table
///
/// `plays` and `player_plays` must already carry Int64 keys; `games` is only
/// read for gameId and the home/visitor codes.
pub fn engineer_plays(plays: LazyFrame, games: LazyFrame, player_plays: LazyFrame) -> LazyFrame {
    let games = games.select([
        col("gameId").cast(DataType::Int64),
        col("homeTeamAbbr").cast(DataType::String),
        col("visitorTeamAbbr").cast(DataType::String),
    ]);

    // 1.0 when the offense is the home team, null when the game is unknown
    let home = col("possessionTeam")
        .eq(col("homeTeamAbbr"))
        .cast(DataType::Float64);
    let away = lit(1.0) - home.clone();
    let pick = |home_col: &str, visitor_col: &str| {
        col(home_col).cast(DataType::Float64) * home.clone()
            + col(visitor_col).cast(DataType::Float64) * away.clone()
    };
    let yardline = col("yardlineNumber").cast(DataType::Float64);

    plays
        .join(
            games,
            [col("gameId")],
            [col("gameId")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            team_motion_aggregates(player_plays),
            [col("gameId"), col("playId"), col("possessionTeam")],
            [col("gameId"), col("playId"), col("teamAbbr")],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([
            pick("preSnapHomeScore", "preSnapVisitorScore").alias("preSnapPossessionTeamScore"),
            pick("preSnapVisitorScore", "preSnapHomeScore").alias("preSnapDefensiveTeamScore"),
            pick(
                "preSnapHomeTeamWinProbability",
                "preSnapVisitorTeamWinProbability",
            )
            .alias("preSnapPossessionTeamWP"),
            pick(
                "preSnapVisitorTeamWinProbability",
                "preSnapHomeTeamWinProbability",
            )
            .alias("preSnapDefensiveTeamWP"),
            when(col("yardlineSide").eq(col("possessionTeam")))
                .then(lit(100.0) - yardline.clone())
                .otherwise(yardline)
                .alias("distanceToEndzone"),
        ])
        .with_columns([(col("preSnapPossessionTeamScore")
            - col("preSnapDefensiveTeamScore"))
        .alias("scoreDifference")])
        .select([
            col("gameId"),
            col("playId"),
            col("quarter").cast(DataType::Int64),
            col("down").cast(DataType::Int64),
            col("yardsToGo").cast(DataType::Int64),
            col("possessionTeam").cast(DataType::String),
            col("defensiveTeam").cast(DataType::String),
            col("gameClock").cast(DataType::String),
            col("homeTeamAbbr"),
            col("visitorTeamAbbr"),
            col("distanceToEndzone"),
            col("preSnapPossessionTeamScore"),
            col("preSnapDefensiveTeamScore"),
            col("scoreDifference"),
            col("preSnapPossessionTeamWP"),
            col("preSnapDefensiveTeamWP"),
            col("offenseMotionAtSnapCount").cast(DataType::Float64),
            col("offenseShiftCount").cast(DataType::Float64),
            col("isDropback").cast(DataType::Boolean),
            col("expectedPointsAdded").cast(DataType::Float64),
        ])
}

/// Parse an `MM:SS` game clock into seconds left in the quarter
pub fn parse_game_clock(clock: &str) -> Option<f64> {
    let (minutes, seconds) = clock.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some((minutes * 60 + seconds) as f64)
}

/// Seconds left in the half; overtime counts only the current period
pub fn half_seconds_remaining(quarter: i64, quarter_seconds: f64) -> f64 {
    match quarter {
        1 | 3 => QUARTER_SECONDS + quarter_seconds,
        _ => quarter_seconds,
    }
}

/// Seconds left in regulation; overtime counts only the current period
pub fn game_seconds_remaining(quarter: i64, quarter_seconds: f64) -> f64 {
    if quarter <= REGULATION_QUARTERS {
        (REGULATION_QUARTERS - quarter) as f64 * QUARTER_SECONDS + quarter_seconds
    } else {
        quarter_seconds
    }
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| {
        FeatureError::Schema(format!("null `{}` in plays row {}", column, row))
    })
}

/// Convert the engineered plays frame into PlayInfo values
pub fn play_infos_from_frame(df: &DataFrame) -> Result<Vec<PlayInfo>> {
    let mut infos = Vec::with_capacity(df.height());

    let game_col = df.column("gameId")?.i64()?;
    let play_col = df.column("playId")?.i64()?;
    let quarter_col = df.column("quarter")?.i64()?;
    let down_col = df.column("down")?.i64()?;
    let ytg_col = df.column("yardsToGo")?.i64()?;
    let possession_col = df.column("possessionTeam")?.str()?;
    let defensive_col = df.column("defensiveTeam")?.str()?;
    let clock_col = df.column("gameClock")?.str()?;
    let home_col = df.column("homeTeamAbbr")?.str()?;
    let visitor_col = df.column("visitorTeamAbbr")?.str()?;
    let endzone_col = df.column("distanceToEndzone")?.f64()?;
    let pos_score_col = df.column("preSnapPossessionTeamScore")?.f64()?;
    let def_score_col = df.column("preSnapDefensiveTeamScore")?.f64()?;
    let diff_col = df.column("scoreDifference")?.f64()?;
    let pos_wp_col = df.column("preSnapPossessionTeamWP")?.f64()?;
    let def_wp_col = df.column("preSnapDefensiveTeamWP")?.f64()?;
    let motion_col = df.column("offenseMotionAtSnapCount")?.f64()?;
    let shift_col = df.column("offenseShiftCount")?.f64()?;
    let dropback_col = df.column("isDropback")?.bool()?;
    let epa_col = df.column("expectedPointsAdded")?.f64()?;

    for i in 0..df.height() {
        let key = PlayKey::new(
            required(game_col.get(i), "gameId", i)?,
            required(play_col.get(i), "playId", i)?,
        );
        let quarter = required(quarter_col.get(i), "quarter", i)?;
        let game_clock = required(clock_col.get(i), "gameClock", i)?.to_string();
        let quarter_seconds = parse_game_clock(&game_clock).ok_or_else(|| {
            FeatureError::Schema(format!("bad gameClock `{}` on play {}", game_clock, key))
        })?;

        infos.push(PlayInfo {
            key,
            quarter,
            down: required(down_col.get(i), "down", i)?,
            yards_to_go: required(ytg_col.get(i), "yardsToGo", i)?,
            possession_team: required(possession_col.get(i), "possessionTeam", i)?.to_string(),
            defensive_team: required(defensive_col.get(i), "defensiveTeam", i)?.to_string(),
            game_clock,
            home_team_abbr: home_col.get(i).map(str::to_string),
            visitor_team_abbr: visitor_col.get(i).map(str::to_string),
            distance_to_endzone: endzone_col.get(i),
            possession_team_score: pos_score_col.get(i),
            defensive_team_score: def_score_col.get(i),
            score_difference: diff_col.get(i),
            possession_team_win_probability: pos_wp_col.get(i),
            defensive_team_win_probability: def_wp_col.get(i),
            quarter_seconds_remaining: quarter_seconds,
            half_seconds_remaining: half_seconds_remaining(quarter, quarter_seconds),
            game_seconds_remaining: game_seconds_remaining(quarter, quarter_seconds),
            offense_motion_at_snap_count: motion_col.get(i),
            offense_shift_count: shift_col.get(i),
            is_dropback: dropback_col.get(i),
            expected_points_added: epa_col.get(i),
        });
    }

    Ok(infos)
}
