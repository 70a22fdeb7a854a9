pub mod annotation;
pub mod joined;
pub mod reading;
pub mod report;

pub use annotation::Annotation;
pub use joined::JoinedRecord;
pub use reading::{GlucoseUnit, RawGlucoseReading, MG_DL_TO_MMOL_L};
pub use report::ParseReport;
