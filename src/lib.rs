pub mod cli;
pub mod error;
pub mod export;
pub mod join;
pub mod models;
pub mod parsing;
pub mod pipeline;
pub mod settings;
pub mod timestamp;
mod utils;

use clap::Parser;

pub use error::{PipelineError, Result};
pub use join::{join_by_timestamp, AnnotationMergePolicy};
pub use models::{Annotation, GlucoseUnit, JoinedRecord, ParseReport, RawGlucoseReading};
pub use parsing::{parse_annotation_csv, parse_glucose_csv};
pub use pipeline::{ingest_files, ingest_texts, JoinedSeries, PipelineOptions};
pub use settings::{ThresholdConfig, ThresholdStore};
pub use timestamp::{parse_device_timestamp, parse_device_timestamp_in, DeviceZone};

/// Binary entrypoint: set up logging, parse arguments, run the command.
pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = cli::Cli::parse();
    log::debug!("gluconote starting with {cli:?}");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(cli::execute(cli))
}
