pub mod chart;
pub mod table;

pub use chart::ChartModel;
pub use table::{export_to_path, export_to_string, write_export};
