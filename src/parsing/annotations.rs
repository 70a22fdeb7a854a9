use crate::error::{PipelineError, Result};
use crate::models::{Annotation, ParseReport};
use crate::parsing::columns::AnnotationLayout;
use crate::parsing::fields::{split_plain, split_quoted, strip_bom};
use crate::timestamp::{parse_device_timestamp_in, DeviceZone};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const DELIMITER: char = ';';

/// Annotations recovered from one notes export, in file order.
#[derive(Debug, Clone)]
pub struct AnnotationLog {
    pub annotations: Vec<Annotation>,
    pub report: ParseReport,
}

/// Parse a semicolon-delimited notes export with a `timestamp;note;details`
/// header (any column order).
///
/// A row is kept when it has a timestamp and at least one of note or details.
/// Rows sharing a timestamp are all kept.
pub fn parse_annotation_csv(text: &str, zone: DeviceZone) -> Result<AnnotationLog> {
    let mut lines = strip_bom(text).lines();
    let header = lines
        .next()
        .ok_or_else(|| PipelineError::missing("annotation export", "header row"))?;
    let layout = AnnotationLayout::resolve(&split_plain(header, DELIMITER))?;

    let mut annotations = Vec::new();
    let mut report = ParseReport::default();

    for (offset, line) in lines.enumerate() {
        let line_no = offset + 2;
        if line.trim().is_empty() {
            continue;
        }
        report.data_lines += 1;

        let fields = split_quoted(line, DELIMITER);
        let raw_timestamp = layout.timestamp(&fields);
        let note = layout.note(&fields);
        let details = layout.details(&fields);

        if raw_timestamp.is_empty() || (note.is_empty() && details.is_empty()) {
            log_debug!("annotation line {line_no}: no timestamp or no text, skipped");
            report.skipped += 1;
            continue;
        }

        let timestamp = match parse_device_timestamp_in(raw_timestamp, zone) {
            Ok(timestamp) => timestamp,
            Err(err) => {
                log_debug!("annotation line {line_no}: {err}, skipped");
                report.skipped += 1;
                continue;
            }
        };

        annotations.push(Annotation {
            timestamp,
            note: note.to_string(),
            details: details.to_string(),
        });
        report.kept += 1;
    }

    log_info!(
        "annotation export: {} annotations kept, {} skipped",
        report.kept,
        report.skipped
    );

    Ok(AnnotationLog {
        annotations,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn parse(text: &str) -> AnnotationLog {
        parse_annotation_csv(text, DeviceZone::utc()).unwrap()
    }

    #[test]
    fn quoted_note_keeps_embedded_semicolon() {
        let log = parse("timestamp;note;details\n01-01-2024 08:00;\"fell; then recovered\";minor\n");
        assert_eq!(
            log.annotations,
            vec![Annotation {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
                note: "fell; then recovered".into(),
                details: "minor".into(),
            }]
        );
    }

    #[test]
    fn columns_may_be_reordered() {
        let log = parse("details;timestamp;note\nlunch;01-01-2024 12:30;meal\n");
        assert_eq!(log.annotations[0].note, "meal");
        assert_eq!(log.annotations[0].details, "lunch");
    }

    #[test]
    fn rows_without_text_or_timestamp_are_dropped() {
        let log = parse(
            "timestamp;note;details\n\
             01-01-2024 08:00;;\n\
             ;meal;lunch\n\
             01-01-2024 09:00;;walk\n\
             bad date;meal;\n",
        );
        assert_eq!(log.annotations.len(), 1);
        assert_eq!(log.annotations[0].note, "");
        assert_eq!(log.annotations[0].details, "walk");
        assert_eq!(log.report.skipped, 3);
    }

    #[test]
    fn same_timestamp_rows_are_not_deduplicated() {
        let log = parse(
            "timestamp;note;details\n\
             01-01-2024 08:00;insulin;4u\n\
             01-01-2024 08:00;meal;toast\n",
        );
        assert_eq!(log.annotations.len(), 2);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = parse_annotation_csv("timestamp;note\n", DeviceZone::utc()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumns { .. }));
    }

    #[test]
    fn empty_text_is_an_error() {
        assert!(parse_annotation_csv("", DeviceZone::utc()).is_err());
    }

    #[test]
    fn header_only_yields_no_annotations() {
        assert!(parse("timestamp;note;details\n").annotations.is_empty());
    }
}
