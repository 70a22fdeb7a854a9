use serde::{Deserialize, Serialize};

/// What happens when more than one annotation lands on the same instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationMergePolicy {
    /// The annotation seen last replaces earlier ones at that instant.
    #[default]
    LastWins,
    /// Notes and details are appended, separated by `"; "`.
    Concatenate,
}

pub(crate) const CONCAT_SEPARATOR: &str = "; ";
