//! Feature Assembler
//!
//! Turns one play key into a full feature mapping, or an explicit skip.

use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::FeatureConfig;
use crate::core::formation::extract_formation;
use crate::core::motion::{motion_delta, path_length_to_snap};
use crate::core::segment::ParsedPlay;
use crate::data::PlayIndex;
use crate::error::{FeatureError, Result};
use crate::features::{game_state_features, FeatureVector};
use crate::models::{KeyEvent, PlayKey, PlayType, TeamLabel};
use crate::pipeline::summary::{RunSummary, SkippedPlay};

const TEAMS: [TeamLabel; 2] = [TeamLabel::Offense, TeamLabel::Defense];

/// Outcome labels for training
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayLabels {
    pub play_type: PlayType,
    pub expected_points_added: f64,
}

/// Every feature group for one play
#[derive(Debug, Clone, PartialEq)]
pub struct PlayFeatures {
    pub key: PlayKey,
    pub game_state: FeatureVector,
    pub motion: FeatureVector,
    /// Prefixed `line_set_`
    pub line_set: FeatureVector,
    /// Prefixed `ball_snap_`
    pub ball_snap: FeatureVector,
    pub labels: PlayLabels,
}

impl PlayFeatures {
    /// All numeric groups in one mapping
    pub fn flatten(&self) -> FeatureVector {
        let mut all = self.game_state.clone();
        all.merge(self.motion.clone());
        all.merge(self.line_set.clone());
        all.merge(self.ball_snap.clone());
        all
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    Features(Box<PlayFeatures>),
    Skipped(SkippedPlay),
}

impl PlayOutcome {
    pub fn key(&self) -> PlayKey {
        match self {
            PlayOutcome::Features(f) => f.key,
            PlayOutcome::Skipped(s) => s.key,
        }
    }

    pub fn features(&self) -> Option<&PlayFeatures> {
        match self {
            PlayOutcome::Features(f) => Some(f.as_ref()),
            PlayOutcome::Skipped(_) => None,
        }
    }
}

/// Output of a batch run
#[derive(Debug, Clone, Default)]
pub struct FeatureRun {
    pub plays: Vec<PlayFeatures>,
    pub skipped: Vec<SkippedPlay>,
    pub summary: RunSummary,
}

impl FeatureRun {
    /// Training rows: keys, every feature, then labels
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let flat: Vec<FeatureVector> = self.plays.iter().map(PlayFeatures::flatten).collect();
        let names: BTreeSet<&str> = flat.iter().flat_map(|f| f.names()).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(names.len() + 4);
        columns.push(Column::new(
            "gameId".into(),
            self.plays.iter().map(|p| p.key.game_id).collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            "playId".into(),
            self.plays.iter().map(|p| p.key.play_id).collect::<Vec<_>>(),
        ));
        for name in names {
            let values: Vec<Option<f64>> = flat.iter().map(|f| f.get(name)).collect();
            columns.push(Column::new(name.into(), values));
        }
        columns.push(Column::new(
            "play_type".into(),
            self.plays
                .iter()
                .map(|p| p.labels.play_type.as_str())
                .collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            "expected_points_added".into(),
            self.plays
                .iter()
                .map(|p| p.labels.expected_points_added)
                .collect::<Vec<_>>(),
        ));

        Ok(DataFrame::new(columns)?)
    }
}

/// Builds model features for plays in a [`PlayIndex`]
pub struct FeatureAssembler {
    index: PlayIndex,
    config: FeatureConfig,
}

impl FeatureAssembler {
    pub fn new(index: PlayIndex, config: FeatureConfig) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &PlayIndex {
        &self.index
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn parse_play(&self, key: PlayKey) -> Result<ParsedPlay> {
        ParsedPlay::build(self.index.play_data(key)?)
    }

    /// Feature groups for an already parsed play
    pub fn build_features(&self, play: &ParsedPlay) -> Result<PlayFeatures> {
        let key = play.key();
        let game_state = game_state_features(&play.info)?;
        let labels = PlayLabels {
            play_type: play.info.play_type().ok_or(FeatureError::MissingValue {
                key,
                field: "is_dropback",
            })?,
            expected_points_added: play.info.expected_points_added.ok_or(
                FeatureError::MissingValue {
                    key,
                    field: "expected_points_added",
                },
            )?,
        };

        let aligned = play.post_line_set();
        let snap_frame = play.key_frames.adjusted_snap_frame();
        let mut motion = FeatureVector::new();
        motion.insert(
            "frames_line_set_to_snap",
            play.key_frames.frames_to_snap() as f64,
        );

        let mut line_set = FeatureVector::new();
        let mut ball_snap = FeatureVector::new();
        for team in TEAMS {
            motion.merge(motion_delta(&play.line_set, &play.ball_snap, team).to_features());
            motion.insert(
                format!("{}_path_length_to_snap", team),
                path_length_to_snap(&aligned, team, snap_frame),
            );

            for (event, out) in [
                (KeyEvent::LineSet, &mut line_set),
                (KeyEvent::BallSnap, &mut ball_snap),
            ] {
                let formation = extract_formation(&play.snapshot(team, event), play.los, &self.config)?;
                out.merge(formation.to_features().with_prefix(&format!("{}_", event)));
            }
        }

        Ok(PlayFeatures {
            key,
            game_state,
            motion,
            line_set,
            ball_snap,
            labels,
        })
    }

    /// Features for one play, or a skip when the play cannot be featurized
    ///
    /// Only fatal errors (schema, polars, unknown key) are returned as `Err`.
    pub fn get_model_features(&self, key: PlayKey) -> Result<PlayOutcome> {
        let result = self
            .parse_play(key)
            .and_then(|play| self.build_features(&play));

        match result {
            Ok(features) => {
                debug!("Play {}: {} features", key, features.flatten().len());
                Ok(PlayOutcome::Features(Box::new(features)))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!("Skipping play {}: {}", key, err);
                Ok(PlayOutcome::Skipped(SkippedPlay::from_error(key, &err)))
            }
        }
    }

    /// Featurize plays in order
    pub fn run(&self, keys: &[PlayKey]) -> Result<FeatureRun> {
        self.run_with_progress(keys, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_play` after each play
    pub fn run_with_progress<F>(&self, keys: &[PlayKey], mut on_play: F) -> Result<FeatureRun>
    where
        F: FnMut(&PlayOutcome),
    {
        let mut run = FeatureRun::default();

        for &key in keys {
            let outcome = self.get_model_features(key)?;
            on_play(&outcome);
            match outcome {
                PlayOutcome::Features(features) => {
                    run.summary.record_processed();
                    run.plays.push(*features);
                }
                PlayOutcome::Skipped(skip) => {
                    run.summary.record_skip(&skip);
                    run.skipped.push(skip);
                }
            }
        }

        run.summary.log();
        Ok(run)
    }

    /// Featurize every indexed play
    pub fn run_all(&self) -> Result<FeatureRun> {
        self.run(self.index.play_keys())
    }
}
