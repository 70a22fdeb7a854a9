use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::FixedOffset;
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use crate::export::{export_to_path, ChartModel};
use crate::join::AnnotationMergePolicy;
use crate::pipeline::{ingest_files, PipelineOptions};
use crate::settings::{JsonFileBackend, ThresholdConfig, ThresholdStore};
use crate::timestamp::DeviceZone;

#[derive(Parser, Debug)]
#[command(name = "gluconote")]
#[command(about = "Join a glucose monitor export with a notes export by timestamp")]
pub struct Cli {
    /// JSON file holding the saved glucose levels
    #[arg(
        long,
        env = "GLUCONOTE_SETTINGS",
        default_value = "gluconote-levels.json",
        global = true
    )]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse both exports, join them and write the results
    Join(JoinArgs),
    /// Inspect or change the chart threshold levels
    Levels {
        #[command(subcommand)]
        action: LevelsAction,
    },
}

#[derive(clap::Args, Debug)]
pub struct JoinArgs {
    /// Comma-delimited glucose monitor export
    #[arg(long)]
    pub glucose: PathBuf,

    /// Semicolon-delimited notes export
    #[arg(long)]
    pub notes: PathBuf,

    /// Write the joined records as CSV
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write the chart model (series, markers, threshold lines) as JSON
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Print the joined records as JSON
    #[arg(long)]
    pub json: bool,

    /// Interpret export timestamps at this offset (e.g. +03:00) instead of local time
    #[arg(long, value_parser = parse_utc_offset)]
    pub utc_offset: Option<FixedOffset>,

    /// What to do with several notes at the same minute
    #[arg(long, value_enum, default_value_t = MergeNotes::Last)]
    pub merge_notes: MergeNotes,
}

#[derive(Subcommand, Debug)]
pub enum LevelsAction {
    Show,
    Set {
        hypo: String,
        target: String,
        medium: String,
        hyper: String,
    },
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeNotes {
    Last,
    Concat,
}

impl From<MergeNotes> for AnnotationMergePolicy {
    fn from(value: MergeNotes) -> Self {
        match value {
            MergeNotes::Last => AnnotationMergePolicy::LastWins,
            MergeNotes::Concat => AnnotationMergePolicy::Concatenate,
        }
    }
}

/// Accepts `+HH:MM`, `-HH:MM`, `+HHMM` or `+HH`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, String> {
    let invalid = || format!("invalid UTC offset '{raw}', expected e.g. +03:00");

    let trimmed = raw.trim();
    let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = trimmed.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let (hours, minutes) = match digits.len() {
        2 => (&digits[..2], "0"),
        4 => (&digits[..2], &digits[2..]),
        _ => return Err(invalid()),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

pub async fn execute(cli: Cli) -> Result<()> {
    let store = ThresholdStore::open(JsonFileBackend::new(cli.settings.clone()));

    match cli.command {
        Command::Join(args) => join(args, &store.current()).await,
        Command::Levels { action } => {
            match action {
                LevelsAction::Show => {}
                LevelsAction::Set {
                    hypo,
                    target,
                    medium,
                    hyper,
                } => {
                    store.save_inputs([hypo.as_str(), target.as_str(), medium.as_str(), hyper.as_str()])?;
                    println!("Glucose level settings saved to {}", cli.settings.display());
                }
                LevelsAction::Reset => {
                    store.reset();
                    println!("Glucose levels reset to defaults");
                }
            }
            print_levels(&store.current());
            Ok(())
        }
    }
}

async fn join(args: JoinArgs, levels: &ThresholdConfig) -> Result<()> {
    if !levels.is_ordered() {
        warn!("Glucose levels are not ordered hypo < target < medium < hyper: {levels:?}");
    }

    let options = PipelineOptions {
        zone: args.utc_offset.map(DeviceZone::Fixed).unwrap_or_default(),
        merge_policy: args.merge_notes.into(),
    };

    let series = ingest_files(&args.glucose, &args.notes, options)
        .await
        .context("Error parsing files")?;

    println!(
        "{} joined records ({} readings in {}, {} notes)",
        series.records.len(),
        series.glucose_report.kept,
        series.source_unit.as_str(),
        series.notes_report.kept
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&series.records)?);
    }

    if let Some(out) = args.out.as_deref() {
        if series.records.is_empty() {
            bail!("No data to export; both files produced no records");
        }
        export_to_path(&series.records, options.zone, out)?;
        info!("Wrote {} rows to {}", series.records.len(), out.display());
    }

    if let Some(chart_path) = args.chart.as_deref() {
        write_chart(&ChartModel::build(&series.records, levels), chart_path)?;
    }

    Ok(())
}

fn write_chart(chart: &ChartModel, path: &Path) -> Result<()> {
    let serialized = serde_json::to_string_pretty(chart)?;
    std::fs::write(path, serialized)
        .with_context(|| format!("failed to write chart model to {}", path.display()))?;
    info!(
        "Wrote chart model with {} points and {} markers to {}",
        chart.series.len(),
        chart.markers.len(),
        path.display()
    );
    Ok(())
}

fn print_levels(levels: &ThresholdConfig) {
    for (field, value) in ThresholdConfig::FIELDS.iter().zip(levels.values()) {
        println!("{field:>6}: {value:.1} mmol/L");
    }
}
