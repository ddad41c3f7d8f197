//! Utility functions and data structures.
//!
//! - [`app_data`] - Resolver configuration and app directories
//! - [`trigram`] - 3-byte sequence extraction for the fuzzy index

pub mod app_data;
pub mod trigram;

pub use app_data::*;
pub use trigram::*;
