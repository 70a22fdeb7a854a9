use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A free-text note/details pair attached to one instant.
///
/// The parser only produces annotations where at least one of `note` and
/// `details` is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub timestamp: DateTime<Utc>,
    pub note: String,
    pub details: String,
}
