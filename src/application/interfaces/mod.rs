mod class_location_store;
mod report_exporter;
mod source_index;
mod type_resolver;

pub use class_location_store::*;
pub use report_exporter::*;
pub use source_index::*;
pub use type_resolver::*;
