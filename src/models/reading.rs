//! Glucose reading data model.
//!
//! Concentrations are always mmol/L once a reading exists; unit conversion
//! happens in the parser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// mg/dL × this factor = mmol/L.
pub const MG_DL_TO_MMOL_L: f64 = 0.0555;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GlucoseUnit {
    MmolPerL,
    MgPerDl,
}

impl GlucoseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlucoseUnit::MmolPerL => "mmol/L",
            GlucoseUnit::MgPerDl => "mg/dL",
        }
    }

    pub fn to_mmol_per_l(&self, value: f64) -> f64 {
        match self {
            GlucoseUnit::MmolPerL => value,
            GlucoseUnit::MgPerDl => value * MG_DL_TO_MMOL_L,
        }
    }
}

/// One glucose measurement at one instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawGlucoseReading {
    pub timestamp: DateTime<Utc>,
    pub concentration: f64,
}
