//! Pipeline-level errors.
//!
//! Per-line problems never surface here; parsers skip those lines and count
//! them in a [`crate::models::ParseReport`]. These variants abort a whole file
//! or a whole settings save.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed timestamp '{raw}': {reason}")]
    MalformedTimestamp { raw: String, reason: String },

    #[error("missing columns in {source_name}: {missing}")]
    MissingColumns {
        source_name: &'static str,
        missing: String,
    },

    #[error("failed to read {}", path.display())]
    FileReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{task} parse worker did not finish")]
    ParseWorker {
        task: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("invalid {field} level '{value}': expected a positive number")]
    InvalidThresholdInput { field: &'static str, value: String },
}

impl PipelineError {
    pub(crate) fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        PipelineError::MalformedTimestamp {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(source_name: &'static str, missing: impl Into<String>) -> Self {
        PipelineError::MissingColumns {
            source_name,
            missing: missing.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
