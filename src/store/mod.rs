//! Immutable operator record store.
//!
//! - [`loader`] - Snapshot file parsing (memory-mapped JSON)
//! - [`record_store`] - Flat record table with an O(1) key index and alias index
//! - [`arena`] - String arena backing the table
//! - [`stats`] - Snapshot statistics for the CLI

pub mod arena;
pub mod loader;
pub mod record_store;
pub mod stats;
pub mod types;

pub use loader::SnapshotError;
pub use record_store::{RecordRef, RecordStore};
pub use types::*;
