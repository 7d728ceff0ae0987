mod analysis_config;
mod call_site;
mod class_locations;
mod compilation_unit;
mod dependency_report;
mod expression_site;
mod method_target;
mod resolved_type;
mod symbol_reference;

pub use analysis_config::*;
pub use call_site::*;
pub use class_locations::*;
pub use compilation_unit::*;
pub use dependency_report::*;
pub use expression_site::*;
pub use method_target::*;
pub use resolved_type::*;
pub use symbol_reference::*;
