//! Query service: the single entry point callers use to resolve names.
//!
//! `resolve` normalizes the query, tries the exact key and alias indexes,
//! falls back to the fuzzy finder on a miss, and hands everything to the
//! [`ResultAssembler`]. It never fails: every outcome is a [`Resolution`].

use crate::normalize::normalize_key;
use crate::query::assembler::ResultAssembler;
use crate::query::exact::{ExactHit, ExactResolver};
use crate::query::handle::{Snapshot, SnapshotHandle};
use crate::query::resolution::{ResolveOptions, Resolution};
use crate::query::scorer::Scorer;
use crate::store::stats::SnapshotStats;
use crate::store::{OperatorRecord, SnapshotError, Status};
use crate::utils::app_data::ResolverConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Effective per-query settings after applying options over the config
#[derive(Debug, Clone, Copy, PartialEq)]
struct Effective {
    status_filter: Option<Status>,
    max_candidates: usize,
    floor: f64,
}

pub struct QueryService {
    handle: SnapshotHandle,
    config: ResolverConfig,
    scorer: Scorer,
}

impl QueryService {
    pub fn new(snapshot: Snapshot, config: ResolverConfig) -> Self {
        let config = config.sanitized();
        Self {
            handle: SnapshotHandle::new(snapshot),
            scorer: Scorer::new(config.scoring.clone()),
            config,
        }
    }

    /// Load the snapshot at `path` and serve it with `config`
    pub fn open(path: &Path, config: ResolverConfig) -> Result<Self, SnapshotError> {
        Ok(Self::new(Snapshot::open(path)?, config))
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The snapshot currently served
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.handle.current()
    }

    /// Swap in a new snapshot. Queries already running finish on the old one.
    pub fn replace_snapshot(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let previous = self.handle.replace(snapshot);
        info!(
            previous = previous.store().meta().version.as_deref().unwrap_or("-"),
            "Replaced operator snapshot"
        );
        previous
    }

    /// Load a snapshot file and swap it in. On error the current snapshot
    /// stays in place.
    pub fn reload(&self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = Snapshot::open(path)?;
        self.replace_snapshot(snapshot);
        Ok(())
    }

    pub fn stats(&self) -> SnapshotStats {
        self.snapshot().stats()
    }

    /// Exact key lookup without alias or fuzzy fallback
    pub fn lookup(&self, raw_key: &str) -> Option<OperatorRecord> {
        let snapshot = self.snapshot();
        let key = normalize_key(raw_key);
        ExactResolver::new(snapshot.store())
            .lookup(&key)
            .map(|r| r.to_record())
    }

    fn effective(&self, options: &ResolveOptions) -> Effective {
        let max_scored = self.config.max_scored.max(1);
        let max_candidates = options
            .max_candidates
            .unwrap_or(self.config.max_candidates)
            .clamp(1, max_scored);
        let floor = match options.similarity_floor {
            Some(f) if !f.is_nan() => f.clamp(0.0, 1.0),
            _ => self.config.similarity_floor,
        };
        Effective {
            status_filter: options.status_filter.or(self.config.default_status_filter),
            max_candidates,
            floor,
        }
    }

    /// Resolve a free-text operator name
    pub fn resolve(&self, raw_query: &str, options: &ResolveOptions) -> Resolution {
        let start = Instant::now();
        let snapshot = self.snapshot();
        let key = normalize_key(raw_query);
        if key.is_empty() {
            debug!("Empty query");
            return Resolution::NotFound;
        }

        let effective = self.effective(options);
        let store = snapshot.store();
        let assembler =
            ResultAssembler::new(store, effective.status_filter, effective.max_candidates);

        let (resolution, path) = match ExactResolver::new(store).resolve(&key) {
            ExactHit::Key(record) => (assembler.found(record), "exact"),
            ExactHit::Alias(rows) => (assembler.alias(rows), "alias"),
            ExactHit::Miss => {
                // With a status filter the finder must over-fetch so that the
                // best matching records with that status are not cut off
                let limit = if effective.status_filter.is_some() {
                    self.config.max_scored
                } else {
                    effective.max_candidates
                };
                let params = self.config.fuzzy_params(limit, effective.floor);
                let (rows, _) = snapshot.fuzzy().find(store, &self.scorer, &key, &params);
                (assembler.candidates(rows), "fuzzy")
            }
        };

        debug!(
            query = %key,
            path,
            kind = resolution.kind(),
            candidates = resolution.candidates().len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Resolved query"
        );
        resolution
    }
}
