//! CSV scanning for the raw input tables

use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const GAMES_FILE: &str = "games.csv";
pub const PLAYS_FILE: &str = "plays.csv";
pub const PLAYERS_FILE: &str = "players.csv";
pub const PLAYER_PLAY_FILE: &str = "player_play.csv";
/// Tracking files are split by week: tracking_week_1.csv, tracking_week_2.csv, ...
pub const TRACKING_PREFIX: &str = "tracking_week_";

/// The input tables, still unevaluated
pub struct RawTables {
    pub games: LazyFrame,
    pub plays: LazyFrame,
    pub players: LazyFrame,
    pub player_plays: LazyFrame,
    /// One frame per tracking file; concatenated by the index
    pub tracking: Vec<LazyFrame>,
}

impl RawTables {
    /// Scan every table from explicit CSV paths
    pub fn from_csv<P: AsRef<Path>>(
        games: P,
        plays: P,
        players: P,
        player_plays: P,
        tracking: &[PathBuf],
    ) -> Result<Self, PolarsError> {
        let tracking = tracking
            .iter()
            .map(scan_csv)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            games: scan_csv(games)?,
            plays: scan_csv(plays)?,
            players: scan_csv(players)?,
            player_plays: scan_csv(player_plays)?,
            tracking,
        })
    }

    /// Scan the standard file layout of a data directory
    ///
    /// When `tracking` is empty every `tracking_week_*.csv` in the directory
    /// is used, in file-name order.
    pub fn from_data_dir<P: AsRef<Path>>(
        data_dir: P,
        tracking: &[PathBuf],
    ) -> Result<Self, PolarsError> {
        let dir = data_dir.as_ref();
        let tracking = if tracking.is_empty() {
            find_tracking_files(dir)?
        } else {
            tracking.to_vec()
        };

        Self::from_csv(
            dir.join(GAMES_FILE),
            dir.join(PLAYS_FILE),
            dir.join(PLAYERS_FILE),
            dir.join(PLAYER_PLAY_FILE),
            &tracking,
        )
    }
}

/// Lazily scan a CSV file, reading `NA` as null
pub fn scan_csv<P: AsRef<Path>>(path: P) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(path.as_ref())
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .with_null_values(Some(NullValues::AllColumnsSingle("NA".into())))
        .finish()
}

/// List tracking files in a directory, sorted by name
pub fn find_tracking_files(dir: &Path) -> Result<Vec<PathBuf>, PolarsError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(TRACKING_PREFIX) && name.ends_with(".csv"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
