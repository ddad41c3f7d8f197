//! Query resolution pipeline.
//!
//! - [`service`] - `resolve(query, options)` facade
//! - [`exact`] - Canonical key and alias lookup
//! - [`fuzzy`] - Token/trigram prefilter and bounded edit-distance scoring
//! - [`assembler`] - Found / ambiguous / not found, status filtering
//! - [`handle`] - Atomically swappable snapshot reference

pub mod assembler;
pub mod distance;
pub mod exact;
pub mod fuzzy;
pub mod handle;
pub mod resolution;
pub mod scorer;
pub mod service;
pub mod topk;

pub use fuzzy::{FinderStats, FuzzyIndex, FuzzyParams};
pub use handle::{Snapshot, SnapshotHandle};
pub use resolution::{MatchCandidate, ResolveOptions, Resolution};
pub use scorer::{ScoreContext, Scorer, ScoringWeights};
pub use service::QueryService;
pub use topk::{ScoredRow, TopKHeap};
