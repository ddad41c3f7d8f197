use crate::store::record_store::RecordStore;
use crate::store::types::Status;
use serde::Serialize;

/// Record count for one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

/// Summary of a loaded snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub version: Option<String>,
    pub generated_at: Option<String>,
    pub records: usize,
    pub aliases: usize,
    pub arena_bytes: usize,
    /// Distinct match-form tokens in the fuzzy index
    pub tokens: usize,
    /// Distinct trigrams in the fuzzy index
    pub trigrams: usize,
    pub statuses: Vec<StatusCount>,
}

impl SnapshotStats {
    /// Store-level counts; index counts are left at zero
    pub fn from_store(store: &RecordStore) -> Self {
        Self {
            version: store.meta().version.clone(),
            generated_at: store.meta().generated_at.clone(),
            records: store.len(),
            aliases: store.alias_count(),
            arena_bytes: store.arena_bytes(),
            tokens: 0,
            trigrams: 0,
            statuses: store
                .status_counts()
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
        }
    }
}

/// Display snapshot statistics
pub fn show_stats(stats: &SnapshotStats) {
    println!("Snapshot Statistics");
    println!("===================");
    println!();
    println!("Version:          {}", stats.version.as_deref().unwrap_or("-"));
    println!("Generated at:     {}", stats.generated_at.as_deref().unwrap_or("-"));
    println!("Operator count:   {}", stats.records);
    println!("Alias count:      {}", stats.aliases);
    println!("String data:      {}", format_size(stats.arena_bytes as u64));
    println!("Index tokens:     {}", stats.tokens);
    println!("Index trigrams:   {}", stats.trigrams);

    println!();
    println!("Operators by status:");
    for entry in stats.statuses.iter().filter(|e| e.count > 0) {
        println!("  {:15} {}", entry.status.as_str(), entry.count);
    }
}

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
