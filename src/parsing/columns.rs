//! Header resolution.
//!
//! Column positions are looked up once from the header row; rows are then read
//! through the named accessors below instead of raw indices.

use crate::error::{PipelineError, Result};
use crate::models::GlucoseUnit;

pub const DEVICE_TIMESTAMP: &str = "Device Timestamp";
pub const HISTORIC_MMOL: &str = "Historic Glucose mmol/L";
pub const SCAN_MMOL: &str = "Scan Glucose mmol/L";
pub const HISTORIC_MG_DL: &str = "Historic Glucose mg/dL";
pub const SCAN_MG_DL: &str = "Scan Glucose mg/dL";

pub const NOTE_TIMESTAMP: &str = "timestamp";
pub const NOTE_TEXT: &str = "note";
pub const NOTE_DETAILS: &str = "details";

fn position<S: AsRef<str>>(headers: &[S], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.as_ref().trim() == name)
}

fn cell<S: AsRef<str>>(fields: &[S], index: usize) -> &str {
    fields.get(index).map(|f| f.as_ref().trim()).unwrap_or("")
}

/// Column layout of a glucose monitor export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlucoseLayout {
    timestamp: usize,
    historic: Option<usize>,
    scan: Option<usize>,
    unit: GlucoseUnit,
}

impl GlucoseLayout {
    /// mmol/L columns win; mg/dL columns are only considered when neither
    /// mmol/L column is present.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let timestamp = position(headers, DEVICE_TIMESTAMP)
            .ok_or_else(|| PipelineError::missing("glucose export", DEVICE_TIMESTAMP))?;

        let mut unit = GlucoseUnit::MmolPerL;
        let mut historic = position(headers, HISTORIC_MMOL);
        let mut scan = position(headers, SCAN_MMOL);

        if historic.is_none() && scan.is_none() {
            unit = GlucoseUnit::MgPerDl;
            historic = position(headers, HISTORIC_MG_DL);
            scan = position(headers, SCAN_MG_DL);
        }

        if historic.is_none() && scan.is_none() {
            return Err(PipelineError::missing(
                "glucose export",
                format!(
                    "one of '{HISTORIC_MMOL}', '{SCAN_MMOL}', '{HISTORIC_MG_DL}', '{SCAN_MG_DL}'"
                ),
            ));
        }

        Ok(Self {
            timestamp,
            historic,
            scan,
            unit,
        })
    }

    pub fn unit(&self) -> GlucoseUnit {
        self.unit
    }

    pub fn timestamp<'a, S: AsRef<str>>(&self, fields: &'a [S]) -> &'a str {
        cell(fields, self.timestamp)
    }

    /// Historic value when present, otherwise the scan value. `None` when both
    /// cells are empty.
    pub fn value<'a, S: AsRef<str>>(&self, fields: &'a [S]) -> Option<&'a str> {
        let historic = self.historic.map(|i| cell(fields, i)).unwrap_or("");
        if !historic.is_empty() {
            return Some(historic);
        }
        let scan = self.scan.map(|i| cell(fields, i)).unwrap_or("");
        (!scan.is_empty()).then_some(scan)
    }
}

/// Column layout of an annotation export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationLayout {
    timestamp: usize,
    note: usize,
    details: usize,
}

impl AnnotationLayout {
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let lookup = [NOTE_TIMESTAMP, NOTE_TEXT, NOTE_DETAILS].map(|name| position(headers, name));

        match lookup {
            [Some(timestamp), Some(note), Some(details)] => Ok(Self {
                timestamp,
                note,
                details,
            }),
            _ => {
                let missing: Vec<&str> = [NOTE_TIMESTAMP, NOTE_TEXT, NOTE_DETAILS]
                    .iter()
                    .zip(lookup.iter())
                    .filter(|(_, found)| found.is_none())
                    .map(|(name, _)| *name)
                    .collect();
                Err(PipelineError::missing("annotation export", missing.join(", ")))
            }
        }
    }

    pub fn timestamp<'a, S: AsRef<str>>(&self, fields: &'a [S]) -> &'a str {
        cell(fields, self.timestamp)
    }

    pub fn note<'a, S: AsRef<str>>(&self, fields: &'a [S]) -> &'a str {
        cell(fields, self.note)
    }

    pub fn details<'a, S: AsRef<str>>(&self, fields: &'a [S]) -> &'a str {
        cell(fields, self.details)
    }
}
