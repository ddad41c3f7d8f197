//! # oplookup - Operator Directory Resolver
//!
//! Resolves free-text oil and gas operator names (any case, spacing,
//! punctuation or DBA phrasing) against an immutable snapshot of operator
//! contact records. Every query ends in exactly one of: the canonical
//! record, a ranked list of candidates, or not found.
//!
//! ## Architecture
//!
//! - [`normalize`] - Exact key form, fuzzy match form, DBA alias splitting
//! - [`store`] - Snapshot loading and the flat, arena-backed record table
//! - [`query`] - Exact, alias and fuzzy resolution behind [`QueryService`]
//! - [`output`] - Human-readable result printing (CLI)
//! - [`utils`] - Configuration and trigram helpers
//!
//! ## Quick Start
//!
//! ```no_run
//! use oplookup::query::{QueryService, ResolveOptions, Resolution};
//! use oplookup::utils::ResolverConfig;
//! use std::path::Path;
//!
//! let path = Path::new("operators.json");
//! let service = QueryService::open(path, ResolverConfig::default()).unwrap();
//!
//! match service.resolve("101 Energy Corp", &ResolveOptions::default()) {
//!     Resolution::Found { key, record } => println!("{}: {:?}", key, record.phone),
//!     Resolution::Ambiguous { candidates } => {
//!         for c in candidates {
//!             println!("{:.3} {}", c.score, c.key);
//!         }
//!     }
//!     Resolution::NotFound => println!("no match"),
//! }
//! ```
//!
//! ## Performance
//!
//! Exact keys resolve through a single hash lookup. Misses go through a
//! token and trigram prefilter backed by Roaring bitmaps, so the bounded
//! edit distance only runs on a small, capped candidate set.

pub mod normalize;
#[cfg(feature = "cli")]
pub mod output;
pub mod query;
pub mod store;
pub mod utils;

pub use query::{QueryService, ResolveOptions, Resolution};
