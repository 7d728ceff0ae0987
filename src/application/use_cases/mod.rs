mod analyze_dependencies;
mod class_locations;
mod collect_dependencies;
mod explore_reachability;
mod inspect_calls;
mod locate_method;

pub use analyze_dependencies::*;
pub use class_locations::*;
pub use collect_dependencies::*;
pub use explore_reachability::*;
pub use inspect_calls::*;
pub use locate_method::*;
