//! Merged per-timestamp view produced by the join engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Annotation, RawGlucoseReading};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRecord {
    pub timestamp: DateTime<Utc>,
    pub concentration: Option<f64>,
    pub note: Option<String>,
    pub details: Option<String>,
}

impl JoinedRecord {
    pub fn has_annotation(&self) -> bool {
        self.note.is_some() || self.details.is_some()
    }

    /// `note:details` when both are present, otherwise whichever one is.
    pub fn combined_notes(&self) -> Option<String> {
        match (self.note.as_deref(), self.details.as_deref()) {
            (Some(note), Some(details)) => Some(format!("{note}:{details}")),
            (Some(note), None) => Some(note.to_string()),
            (None, Some(details)) => Some(details.to_string()),
            (None, None) => None,
        }
    }

    /// Replace this record's annotation fields with `annotation`'s.
    pub(crate) fn attach(&mut self, annotation: &Annotation) {
        self.note = non_empty(&annotation.note);
        self.details = non_empty(&annotation.details);
    }
}

impl From<&RawGlucoseReading> for JoinedRecord {
    fn from(reading: &RawGlucoseReading) -> Self {
        Self {
            timestamp: reading.timestamp,
            concentration: Some(reading.concentration),
            note: None,
            details: None,
        }
    }
}

impl From<&Annotation> for JoinedRecord {
    fn from(annotation: &Annotation) -> Self {
        Self {
            timestamp: annotation.timestamp,
            concentration: None,
            note: non_empty(&annotation.note),
            details: non_empty(&annotation.details),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
