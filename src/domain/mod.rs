//! # Domain Layer
//!
//! Declaration models, resolution outcomes, reports and errors.
//! This layer performs no I/O.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
