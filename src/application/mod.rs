//! # Application Layer
//!
//! Use cases and the traits the connector layer implements for them.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
