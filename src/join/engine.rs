use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::join::policy::{AnnotationMergePolicy, CONCAT_SEPARATOR};
use crate::models::{Annotation, JoinedRecord, RawGlucoseReading};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Full outer join of readings and annotations on exact timestamp equality.
///
/// Every reading is registered first; a repeated reading timestamp keeps the
/// first concentration. Annotations are then merged in input order, either
/// onto an existing slot (keeping its concentration) or into a new one. The
/// result holds one record per distinct timestamp, ascending.
pub fn join_by_timestamp(
    readings: &[RawGlucoseReading],
    annotations: &[Annotation],
    policy: AnnotationMergePolicy,
) -> Vec<JoinedRecord> {
    let mut slots: BTreeMap<DateTime<Utc>, JoinedRecord> = BTreeMap::new();

    for reading in readings {
        slots
            .entry(reading.timestamp)
            .or_insert_with(|| JoinedRecord::from(reading));
    }

    let mut collisions = 0usize;
    for annotation in annotations {
        match slots.entry(annotation.timestamp) {
            Entry::Vacant(slot) => {
                slot.insert(JoinedRecord::from(annotation));
            }
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                if record.has_annotation() {
                    collisions += 1;
                }
                merge_annotation(record, annotation, policy);
            }
        }
    }

    if collisions > 0 {
        log_debug!("{collisions} annotations shared an instant with an earlier one ({policy:?})");
    }

    slots.into_values().collect()
}

fn merge_annotation(
    record: &mut JoinedRecord,
    annotation: &Annotation,
    policy: AnnotationMergePolicy,
) {
    match policy {
        AnnotationMergePolicy::Concatenate if record.has_annotation() => {
            record.note = append(record.note.take(), &annotation.note);
            record.details = append(record.details.take(), &annotation.details);
        }
        _ => record.attach(annotation),
    }
}

fn append(existing: Option<String>, addition: &str) -> Option<String> {
    match existing {
        _ if addition.is_empty() => existing,
        Some(mut text) => {
            text.push_str(CONCAT_SEPARATOR);
            text.push_str(addition);
            Some(text)
        }
        None => Some(addition.to_string()),
    }
}
