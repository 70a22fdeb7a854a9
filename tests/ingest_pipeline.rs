use std::collections::BTreeSet;
use std::fs;

use chrono::{TimeZone, Utc};
use gluconote_lib::{
    ingest_files, ingest_texts, AnnotationMergePolicy, DeviceZone, GlucoseUnit, PipelineError,
    PipelineOptions,
};

const GLUCOSE_MG_DL: &str = "\u{feff}Glucose Data,Generated on,10-01-2024 09:00,Generated by,user\n\
Device,Serial Number,Device Timestamp,Record Type,Historic Glucose mg/dL,Scan Glucose mg/dL,Notes\n\
FreeStyle LibreLink,ABC-123,01-01-2024 08:00,0,90,,\n\
FreeStyle LibreLink,ABC-123,01-01-2024 08:15,0,180,,\n\
FreeStyle LibreLink,ABC-123,01-01-2024 08:15,1,,200,\n\
FreeStyle LibreLink,ABC-123,01-01-2024 08:20,1,,126,\n\
FreeStyle LibreLink,ABC-123,01-01-2024 08:25,6,,,\n\
\n";

const NOTES: &str = "timestamp;note;details\n\
01-01-2024 08:15;meal;\"toast; jam\"\n\
01-01-2024 08:17;insulin;4u\n\
01-01-2024 08:17;walk;\n\
01-01-2024 08:30;;felt dizzy\n";

fn options(merge_policy: AnnotationMergePolicy) -> PipelineOptions {
    PipelineOptions {
        zone: DeviceZone::utc(),
        merge_policy,
    }
}

fn at(minute: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, minute, 0).unwrap()
}

#[tokio::test]
async fn full_outer_join_over_real_shaped_exports() {
    let series = ingest_texts(GLUCOSE_MG_DL, NOTES, options(AnnotationMergePolicy::LastWins))
        .await
        .unwrap();

    assert_eq!(series.source_unit, GlucoseUnit::MgPerDl);
    assert_eq!(series.glucose_report.kept, 3);
    assert_eq!(series.glucose_report.duplicates, 1);
    assert_eq!(series.glucose_report.skipped, 1);
    assert_eq!(series.notes_report.kept, 4);

    let times: Vec<_> = series.records.iter().map(|r| r.timestamp).collect();
    assert_eq!(times, vec![at(0), at(15), at(17), at(20), at(30)]);

    let meal = &series.records[1];
    assert!((meal.concentration.unwrap() - 9.99).abs() < 1e-9);
    assert_eq!(meal.note.as_deref(), Some("meal"));
    assert_eq!(meal.details.as_deref(), Some("toast; jam"));

    let collided = &series.records[2];
    assert_eq!(collided.concentration, None);
    assert_eq!(collided.note.as_deref(), Some("walk"));
    assert_eq!(collided.details, None);

    let dizzy = &series.records[4];
    assert_eq!(dizzy.note, None);
    assert_eq!(dizzy.details.as_deref(), Some("felt dizzy"));
}

#[tokio::test]
async fn record_count_matches_distinct_timestamps() {
    let series = ingest_texts(GLUCOSE_MG_DL, NOTES, options(AnnotationMergePolicy::LastWins))
        .await
        .unwrap();

    let glucose = gluconote_lib::parse_glucose_csv(GLUCOSE_MG_DL, DeviceZone::utc()).unwrap();
    let notes = gluconote_lib::parse_annotation_csv(NOTES, DeviceZone::utc()).unwrap();
    let distinct: BTreeSet<_> = glucose
        .readings
        .iter()
        .map(|r| r.timestamp)
        .chain(notes.annotations.iter().map(|a| a.timestamp))
        .collect();

    assert_eq!(series.records.len(), distinct.len());
}

#[tokio::test]
async fn concatenate_policy_keeps_colliding_notes() {
    let series = ingest_texts(GLUCOSE_MG_DL, NOTES, options(AnnotationMergePolicy::Concatenate))
        .await
        .unwrap();
    let collided = &series.records[2];
    assert_eq!(collided.note.as_deref(), Some("insulin; walk"));
    assert_eq!(collided.details.as_deref(), Some("4u"));
}

#[tokio::test]
async fn reads_both_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let glucose_path = dir.path().join("glucose.csv");
    let notes_path = dir.path().join("notes.csv");
    fs::write(&glucose_path, GLUCOSE_MG_DL).unwrap();
    fs::write(&notes_path, NOTES).unwrap();

    let from_disk = ingest_files(&glucose_path, &notes_path, options(AnnotationMergePolicy::LastWins))
        .await
        .unwrap();
    let in_memory = ingest_texts(GLUCOSE_MG_DL, NOTES, options(AnnotationMergePolicy::LastWins))
        .await
        .unwrap();
    assert_eq!(from_disk.records, in_memory.records);
}

#[tokio::test]
async fn header_only_exports_join_to_nothing() {
    let glucose = "preamble\nDevice Timestamp,Historic Glucose mmol/L\n";
    let notes = "timestamp;note;details\n";
    let series = ingest_texts(glucose, notes, options(AnnotationMergePolicy::LastWins))
        .await
        .unwrap();
    assert!(series.records.is_empty());
}

#[tokio::test]
async fn glucose_file_without_value_columns_fails() {
    let glucose = "preamble\nDevice Timestamp,Notes\n01-01-2024 08:00,x\n";
    let err = ingest_texts(glucose, NOTES, options(AnnotationMergePolicy::LastWins))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumns { .. }));
}
