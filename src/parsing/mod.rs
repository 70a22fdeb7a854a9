pub mod annotations;
pub mod columns;
pub mod fields;
pub mod glucose;

pub use annotations::{parse_annotation_csv, AnnotationLog};
pub use glucose::{parse_glucose_csv, GlucoseSeries};
