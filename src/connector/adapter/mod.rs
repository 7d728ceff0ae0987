mod archive_type_resolver;
mod expression_walker;
mod java_parser;
mod java_symbol_solver;
mod json_class_location_store;
mod json_report_exporter;
mod platform_type_resolver;
mod source_root_resolver;
mod source_tree_index;
mod type_index;

pub use archive_type_resolver::*;
pub use expression_walker::*;
pub use java_parser::*;
pub use java_symbol_solver::*;
pub use json_class_location_store::*;
pub use json_report_exporter::*;
pub use platform_type_resolver::*;
pub use source_root_resolver::*;
pub use source_tree_index::*;
pub use type_index::*;
