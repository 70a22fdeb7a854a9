//! End-to-end ingest: parse both exports concurrently, then join.
//!
//! The two parses share nothing, so they run side by side and the join waits
//! for both. If either fails the whole ingest fails and the other result is
//! dropped.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::join::{join_by_timestamp, AnnotationMergePolicy};
use crate::models::{GlucoseUnit, JoinedRecord, ParseReport};
use crate::parsing::{parse_annotation_csv, parse_glucose_csv, AnnotationLog, GlucoseSeries};
use crate::timestamp::DeviceZone;

const ENABLE_LOGS: bool = true;

use crate::log_info;

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub zone: DeviceZone,
    pub merge_policy: AnnotationMergePolicy,
}

/// Joined records plus per-file parse accounting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedSeries {
    pub records: Vec<JoinedRecord>,
    pub source_unit: GlucoseUnit,
    pub glucose_report: ParseReport,
    pub notes_report: ParseReport,
}

impl JoinedSeries {
    fn assemble(glucose: GlucoseSeries, notes: AnnotationLog, options: &PipelineOptions) -> Self {
        let records = join_by_timestamp(&glucose.readings, &notes.annotations, options.merge_policy);
        log_info!(
            "joined {} readings and {} annotations into {} records",
            glucose.readings.len(),
            notes.annotations.len(),
            records.len()
        );

        Self {
            records,
            source_unit: glucose.source_unit,
            glucose_report: glucose.report,
            notes_report: notes.report,
        }
    }
}

/// Parse and join two exports already held in memory.
pub async fn ingest_texts(
    glucose_text: &str,
    notes_text: &str,
    options: PipelineOptions,
) -> Result<JoinedSeries> {
    let (glucose, notes) = tokio::try_join!(
        parse_glucose_off_thread(glucose_text.to_owned(), options.zone),
        parse_notes_off_thread(notes_text.to_owned(), options.zone)
    )?;

    Ok(JoinedSeries::assemble(glucose, notes, &options))
}

/// Read both exports from disk concurrently, then parse and join them.
pub async fn ingest_files(
    glucose_path: &Path,
    notes_path: &Path,
    options: PipelineOptions,
) -> Result<JoinedSeries> {
    let (glucose, notes) = tokio::try_join!(
        async {
            let text = read_export(glucose_path).await?;
            parse_glucose_off_thread(text, options.zone).await
        },
        async {
            let text = read_export(notes_path).await?;
            parse_notes_off_thread(text, options.zone).await
        }
    )?;

    Ok(JoinedSeries::assemble(glucose, notes, &options))
}

async fn parse_glucose_off_thread(text: String, zone: DeviceZone) -> Result<GlucoseSeries> {
    run_blocking("glucose export", move || parse_glucose_csv(&text, zone)).await
}

async fn parse_notes_off_thread(text: String, zone: DeviceZone) -> Result<AnnotationLog> {
    run_blocking("annotation export", move || parse_annotation_csv(&text, zone)).await
}

/// Parsing is CPU-bound, so it runs on the blocking pool where the two files
/// can make progress in parallel.
async fn run_blocking<T, F>(task: &'static str, parse: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(parse)
        .await
        .map_err(|source| PipelineError::ParseWorker { task, source })?
}

/// Exports are decoded leniently; invalid UTF-8 sequences become U+FFFD
/// instead of failing the whole file.
async fn read_export(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| PipelineError::FileReadFailure {
            path: PathBuf::from(path),
            source,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLUCOSE: &str = "Glucose Data\n\
        Device,Device Timestamp,Historic Glucose mmol/L,Scan Glucose mmol/L\n\
        Libre,01-01-2024 08:00,5.0,\n\
        Libre,01-01-2024 08:15,6.0,\n";

    const NOTES: &str = "timestamp;note;details\n\
        01-01-2024 08:00;meal;lunch\n";

    fn options() -> PipelineOptions {
        PipelineOptions {
            zone: DeviceZone::utc(),
            ..PipelineOptions::default()
        }
    }

    #[tokio::test]
    async fn joins_in_memory_exports() {
        let series = ingest_texts(GLUCOSE, NOTES, options()).await.unwrap();
        assert_eq!(series.records.len(), 2);
        assert_eq!(series.records[0].note.as_deref(), Some("meal"));
        assert_eq!(series.records[1].note, None);
        assert_eq!(series.glucose_report.kept, 2);
        assert_eq!(series.notes_report.kept, 1);
    }

    #[tokio::test]
    async fn one_bad_file_fails_the_whole_ingest() {
        let err = ingest_texts(GLUCOSE, "when;what\n", options()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingColumns { source_name: "annotation export", .. }
        ));

        let err = ingest_texts("preamble\nDevice,Value\n", NOTES, options())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingColumns { source_name: "glucose export", .. }
        ));
    }

    #[tokio::test]
    async fn parses_run_on_the_blocking_pool() {
        let caller = std::thread::current().id();
        let worker = run_blocking("glucose export", || Ok(std::thread::current().id()))
            .await
            .unwrap();
        assert_ne!(worker, caller);
    }

    #[tokio::test]
    async fn crashed_parse_worker_becomes_an_error() {
        let err = run_blocking::<(), _>("annotation export", || panic!("parser crashed"))
            .await
            .unwrap_err();
        match err {
            PipelineError::ParseWorker { task, source } => {
                assert_eq!(task, "annotation export");
                assert!(source.is_panic());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.csv");
        std::fs::write(&notes, NOTES).unwrap();
        let missing = dir.path().join("absent.csv");

        match ingest_files(&missing, &notes, options()).await.unwrap_err() {
            PipelineError::FileReadFailure { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
