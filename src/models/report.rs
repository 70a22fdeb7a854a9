use serde::{Deserialize, Serialize};

/// Line accounting for one parsed export.
///
/// `data_lines` counts non-blank data lines; every one of them ends up in
/// exactly one of `kept`, `skipped` or `duplicates`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub data_lines: usize,
    pub kept: usize,
    pub skipped: usize,
    pub duplicates: usize,
}
