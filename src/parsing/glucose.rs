use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{PipelineError, Result};
use crate::models::{GlucoseUnit, ParseReport, RawGlucoseReading};
use crate::parsing::columns::GlucoseLayout;
use crate::parsing::fields::{split_plain, strip_bom};
use crate::timestamp::{parse_device_timestamp_in, DeviceZone};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Readings recovered from one glucose monitor export.
#[derive(Debug, Clone)]
pub struct GlucoseSeries {
    /// One reading per distinct timestamp, in file order.
    pub readings: Vec<RawGlucoseReading>,
    /// Unit the export was written in; readings are already mmol/L.
    pub source_unit: GlucoseUnit,
    pub report: ParseReport,
}

/// Parse a glucose monitor export.
///
/// Line 1 is a device preamble and is ignored, line 2 is the header, data
/// starts on line 3. Lines with a missing or unparseable timestamp or value are
/// skipped. When several lines share a timestamp the first usable one wins.
pub fn parse_glucose_csv(text: &str, zone: DeviceZone) -> Result<GlucoseSeries> {
    let mut lines = strip_bom(text).lines();
    let _preamble = lines.next();
    let header = lines
        .next()
        .ok_or_else(|| PipelineError::missing("glucose export", "header row on line 2"))?;

    let layout = GlucoseLayout::resolve(&split_plain(header, ','))?;
    let unit = layout.unit();
    log_debug!("glucose export layout resolved: {layout:?}");

    let mut readings = Vec::new();
    let mut seen: HashSet<DateTime<Utc>> = HashSet::new();
    let mut report = ParseReport::default();

    for (offset, line) in lines.enumerate() {
        let line_no = offset + 3;
        if line.trim().is_empty() {
            continue;
        }
        report.data_lines += 1;

        let fields = split_plain(line, ',');

        let raw_timestamp = layout.timestamp(&fields);
        if raw_timestamp.is_empty() {
            log_debug!("glucose line {line_no}: empty timestamp, skipped");
            report.skipped += 1;
            continue;
        }
        let timestamp = match parse_device_timestamp_in(raw_timestamp, zone) {
            Ok(timestamp) => timestamp,
            Err(err) => {
                log_debug!("glucose line {line_no}: {err}, skipped");
                report.skipped += 1;
                continue;
            }
        };

        if seen.contains(&timestamp) {
            report.duplicates += 1;
            continue;
        }

        let Some(concentration) = layout.value(&fields).and_then(parse_value) else {
            log_debug!("glucose line {line_no}: no usable glucose value, skipped");
            report.skipped += 1;
            continue;
        };

        seen.insert(timestamp);
        readings.push(RawGlucoseReading {
            timestamp,
            concentration: unit.to_mmol_per_l(concentration),
        });
        report.kept += 1;
    }

    log_info!(
        "glucose export ({}): {} readings kept, {} skipped, {} duplicate timestamps",
        unit.as_str(),
        report.kept,
        report.skipped,
        report.duplicates
    );

    Ok(GlucoseSeries {
        readings,
        source_unit: unit,
        report,
    })
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
