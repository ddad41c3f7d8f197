use crate::query::fuzzy::FuzzyIndex;
use crate::store::stats::SnapshotStats;
use crate::store::{RecordStore, SnapshotError};
use arc_swap::ArcSwap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// One immutable generation of the operator table and its search index
pub struct Snapshot {
    store: RecordStore,
    fuzzy: FuzzyIndex,
}

impl Snapshot {
    /// Build the fuzzy index for a loaded store
    pub fn new(store: RecordStore) -> Self {
        let start = Instant::now();
        let fuzzy = FuzzyIndex::build(&store);
        info!(
            keys = fuzzy.len(),
            tokens = fuzzy.token_count(),
            trigrams = fuzzy.trigram_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built fuzzy index"
        );
        Self { store, fuzzy }
    }

    /// Load a snapshot file and index it
    pub fn open(path: &Path) -> Result<Self, SnapshotError> {
        Ok(Self::new(RecordStore::open(path)?))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn fuzzy(&self) -> &FuzzyIndex {
        &self.fuzzy
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            tokens: self.fuzzy.token_count(),
            trigrams: self.fuzzy.trigram_count(),
            ..SnapshotStats::from_store(&self.store)
        }
    }
}

/// Shared reference to the current snapshot.
///
/// Readers load the `Arc` without taking a lock and keep using that
/// generation for the rest of their call; `replace` swaps the pointer
/// atomically and never touches the old snapshot, which is dropped once the
/// last reader releases it.
pub struct SnapshotHandle {
    current: ArcSwap<Snapshot>,
}

impl SnapshotHandle {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Install a new snapshot, returning the previous one
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.current.swap(Arc::new(snapshot))
    }
}
