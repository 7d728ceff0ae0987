//! # Connector Layer
//!
//! Implementations of the application interfaces:
//! - Parsing and indexing Java sources (tree-sitter)
//! - The type resolver chain: source roots, archives, platform library
//! - Symbol resolution inside method bodies
//! - JSON persistence for the class location cache and exported reports

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
