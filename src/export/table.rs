use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};

use crate::models::JoinedRecord;
use crate::timestamp::{format_export_timestamp, DeviceZone};

pub const EXPORT_HEADER: [&str; 3] = ["Timestamp", "Glucose Rate (mmol/L)", "Notes"];

/// Write joined records as `Timestamp,Glucose Rate (mmol/L),Notes`.
///
/// Timestamps are day-first wall-clock time in `zone`. Absent glucose values
/// and notes become empty cells; notes are quoted only when they contain a
/// comma or a quote.
pub fn write_export<W: Write>(records: &[JoinedRecord], zone: DeviceZone, out: W) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(out);

    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        let glucose = record
            .concentration
            .map(|value| value.to_string())
            .unwrap_or_default();
        let notes = record.combined_notes().unwrap_or_default();
        writer.write_record([
            format_export_timestamp(record.timestamp, zone),
            glucose,
            notes,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_to_path(records: &[JoinedRecord], zone: DeviceZone, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_export(records, zone, file)
        .with_context(|| format!("failed to write export to {}", path.display()))
}

pub fn export_to_string(records: &[JoinedRecord], zone: DeviceZone) -> Result<String> {
    let mut buffer = Vec::new();
    write_export(records, zone, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(
        minute: u32,
        concentration: Option<f64>,
        note: Option<&str>,
        details: Option<&str>,
    ) -> JoinedRecord {
        JoinedRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 8, minute, 0).unwrap(),
            concentration,
            note: note.map(str::to_string),
            details: details.map(str::to_string),
        }
    }

    #[test]
    fn renders_header_and_rows() {
        let csv = export_to_string(
            &[
                record(0, Some(5.4), Some("meal"), Some("lunch")),
                record(5, Some(6.0), None, None),
                record(7, None, None, Some("walk")),
            ],
            DeviceZone::utc(),
        )
        .unwrap();

        assert_eq!(
            csv,
            "Timestamp,Glucose Rate (mmol/L),Notes\n\
             05/03/2024 08:00:00,5.4,meal:lunch\n\
             05/03/2024 08:05:00,6,\n\
             05/03/2024 08:07:00,,walk\n"
        );
    }

    #[test]
    fn quotes_notes_with_commas_or_quotes() {
        let csv = export_to_string(
            &[
                record(0, None, Some("pizza, large"), None),
                record(1, None, Some(r#"said "ok""#), None),
            ],
            DeviceZone::utc(),
        )
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], r#"05/03/2024 08:00:00,,"pizza, large""#);
        assert_eq!(lines[2], r#"05/03/2024 08:01:00,,"said ""ok""""#);
    }

    #[test]
    fn empty_sequence_is_header_only() {
        let csv = export_to_string(&[], DeviceZone::utc()).unwrap();
        assert_eq!(csv, "Timestamp,Glucose Rate (mmol/L),Notes\n");
    }
}
