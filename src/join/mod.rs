pub mod engine;
pub mod policy;

pub use engine::join_by_timestamp;
pub use policy::AnnotationMergePolicy;
