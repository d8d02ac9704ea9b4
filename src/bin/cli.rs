//! Presnap CLI - Command-line interface for pre-snap feature extraction

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::{CsvWriter, SerWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use presnap::core::{locate_first_down_marker, locate_line_of_scrimmage, Zone, ZoneGrid};
use presnap::data::{PlayIndex, RawTables};
use presnap::pipeline::{FeatureAssembler, PlayOutcome};
use presnap::{FeatureConfig, FeatureError, KeyEvent, PlayKey, TeamLabel};

/// Default data directory (relative to project root)
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser)]
#[command(name = "presnap")]
#[command(author, version, about = "Pre-snap formation features from tracking data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding games.csv, plays.csv, players.csv, player_play.csv
    /// and tracking_week_*.csv
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// JSON feature configuration; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build features for every play
    Run {
        /// Tracking files to use instead of every tracking_week_*.csv
        #[arg(long, num_args = 1..)]
        tracking: Vec<PathBuf>,

        /// Write the training rows to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only process the first N plays
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show features and zone occupancy for a single play
    Play {
        #[arg(short, long)]
        game_id: i64,

        #[arg(short, long)]
        play_id: i64,

        /// Tracking files to use instead of every tracking_week_*.csv
        #[arg(long, num_args = 1..)]
        tracking: Vec<PathBuf>,
    },

    /// List indexed play keys
    Plays {
        /// Tracking files to use instead of every tracking_week_*.csv
        #[arg(long, num_args = 1..)]
        tracking: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    println!("{}", "Presnap CLI v0.1.0".cyan().bold());
    println!();

    let config = match &cli.config {
        Some(path) => FeatureConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => FeatureConfig::default(),
    };

    match cli.command {
        Commands::Run {
            tracking,
            output,
            limit,
        } => run_features(&cli.data_dir, &tracking, config, output.as_deref(), limit),
        Commands::Play {
            game_id,
            play_id,
            tracking,
        } => show_play(&cli.data_dir, &tracking, config, PlayKey::new(game_id, play_id)),
        Commands::Plays { tracking } => list_plays(&cli.data_dir, &tracking),
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.set_message(message);
    Ok(pb)
}

fn load_index(data_dir: &Path, tracking: &[PathBuf]) -> Result<PlayIndex> {
    let pb = spinner("Indexing plays...")?;

    let tables = RawTables::from_data_dir(data_dir, tracking)
        .with_context(|| format!("Failed to scan tables in {:?}", data_dir))?;
    if tables.tracking.is_empty() {
        pb.finish_and_clear();
        anyhow::bail!("No tracking files found in {:?}", data_dir);
    }
    let index = PlayIndex::new(tables).context("Failed to build play index")?;

    pb.finish_and_clear();
    Ok(index)
}

fn run_features(
    data_dir: &Path,
    tracking: &[PathBuf],
    config: FeatureConfig,
    output: Option<&Path>,
    limit: Option<usize>,
) -> Result<()> {
    println!("{}: {:?}", "Building features".green(), data_dir);

    let assembler = FeatureAssembler::new(load_index(data_dir, tracking)?, config);
    let keys = assembler.index().play_keys();
    let keys = match limit {
        Some(n) => &keys[..n.min(keys.len())],
        None => keys,
    };

    let pb = ProgressBar::new(keys.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let run = assembler
        .run_with_progress(keys, |outcome| {
            pb.set_message(outcome.key().to_string());
            pb.inc(1);
        })
        .context("Feature run failed")?;
    pb.finish_and_clear();

    println!("\n{}", "=".repeat(40));
    println!("{}", "RUN SUMMARY".yellow().bold());
    println!("{}", "=".repeat(40));
    println!("{}", run.summary);

    if let Some(path) = output {
        let mut df = run.to_dataframe().context("Failed to build training rows")?;
        let mut file =
            File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .with_context(|| format!("Failed to write {:?}", path))?;
        println!(
            "\n{}: {} rows x {} columns to {:?}",
            "Saved".green(),
            df.height(),
            df.width(),
            path
        );
    }

    Ok(())
}

fn print_zone_occupancy(index: &PlayIndex, key: PlayKey) {
    let rows = index.anchor_snapshot(key, KeyEvent::LineSet);
    let (los, info) = match (locate_line_of_scrimmage(key, rows), index.play_info(key)) {
        (Ok(los), Some(info)) => (los, info),
        (Err(e), _) => {
            println!("\n{}: {}", "No zones".yellow(), e);
            return;
        }
        (_, None) => return,
    };
    let grid = ZoneGrid::new(los, locate_first_down_marker(los, info.yards_to_go));

    println!("\n{}", "Zone occupancy at line-set:".yellow().bold());
    println!("{:>8} {:>8} {:>8}", "Zone", "Offense", "Defense");
    println!("{}", "-".repeat(26));

    let offense = grid.occupancy(rows.iter().filter(|r| r.team == TeamLabel::Offense));
    let defense = grid.occupancy(rows.iter().filter(|r| r.team == TeamLabel::Defense));
    for zone in Zone::all() {
        let o = offense.get(&zone).copied().unwrap_or(0);
        let d = defense.get(&zone).copied().unwrap_or(0);
        if o + d > 0 {
            println!("{:>8} {:>8} {:>8}", zone.label(), o, d);
        }
    }
}

fn show_play(data_dir: &Path, tracking: &[PathBuf], config: FeatureConfig, key: PlayKey) -> Result<()> {
    println!("{}: {}", "Play".green(), key);

    let assembler = FeatureAssembler::new(load_index(data_dir, tracking)?, config);

    match assembler.get_model_features(key) {
        Ok(PlayOutcome::Features(features)) => {
            let labels = features.labels;
            println!(
                "{} {}  EPA {:+.3}",
                "Label:".yellow().bold(),
                labels.play_type.as_str(),
                labels.expected_points_added
            );
            println!("\n{}", "Features:".yellow().bold());
            for (name, value) in &features.flatten() {
                println!("  {:<48} {:>12.4}", name, value);
            }
        }
        Ok(PlayOutcome::Skipped(skip)) => {
            println!("{}: {}", "Skipped".red(), skip.reason);
        }
        Err(FeatureError::UnknownPlay(key)) => {
            anyhow::bail!("Play {} is not in plays.csv", key);
        }
        Err(e) => return Err(e).context("Failed to build features"),
    }

    // Zones only need the line-set frame, so skipped plays still get them
    print_zone_occupancy(assembler.index(), key);

    Ok(())
}

fn list_plays(data_dir: &Path, tracking: &[PathBuf]) -> Result<()> {
    let index = load_index(data_dir, tracking)?;

    if index.is_empty() {
        println!("{}", "No plays found.".yellow());
        return Ok(());
    }

    println!("{}", "Plays:".yellow().bold());
    println!("{:>12} {:>8} {:>10} {:>6} {:>6}", "Game", "Play", "Offense", "Qtr", "Down");
    println!("{}", "-".repeat(46));
    for key in index.play_keys() {
        if let Some(info) = index.play_info(*key) {
            println!(
                "{:>12} {:>8} {:>10} {:>6} {:>6}",
                key.game_id, key.play_id, info.possession_team, info.quarter, info.down
            );
        }
    }
    println!("\n{} plays", index.len());

    Ok(())
}
