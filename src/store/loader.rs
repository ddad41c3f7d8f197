//! Snapshot file parsing.
//!
//! A snapshot is a JSON document produced by the regeneration job:
//!
//! ```json
//! {
//!   "version": "2024-06-01",
//!   "generatedAt": "2024-06-01T04:00:00Z",
//!   "operators": {
//!     "101 energy corporation": {
//!       "name": "101 ENERGY CORPORATION",
//!       "phone": "(405) 232-9700",
//!       "status": "OPEN",
//!       ...
//!     }
//!   }
//! }
//! ```
//!
//! Operator entries are kept in file order and duplicates are not collapsed
//! here, so the store builder can reject them instead of silently keeping
//! the last one.

use crate::store::types::{OperatorRecord, SnapshotMeta};
use memmap2::Mmap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Fatal snapshot problems. Any of these aborts loading; there is no
/// partially loaded store.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate operator key {0:?}")]
    DuplicateKey(String),

    #[error("operator key {key:?} is not canonical (normalizes to {expected:?})")]
    NonCanonicalKey { key: String, expected: String },

    #[error("snapshot contains an empty operator key")]
    EmptyKey,

    #[error("operator {0:?} has an empty name")]
    EmptyName(String),

    #[error("snapshot exceeds record table capacity")]
    TooLarge,
}

/// Parsed but not yet validated snapshot contents
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
    pub operators: OperatorTable,
}

impl RawSnapshot {
    pub fn meta(&self) -> SnapshotMeta {
        SnapshotMeta {
            version: self.version.clone(),
            generated_at: self.generated_at.clone(),
        }
    }
}

/// Operator entries in file order, duplicates included
#[derive(Debug, Default)]
pub struct OperatorTable(pub Vec<(String, OperatorRecord)>);

impl<'de> Deserialize<'de> for OperatorTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = OperatorTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of operator key to operator record")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, record)) = map.next_entry::<String, OperatorRecord>()? {
                    entries.push((key, record));
                }
                Ok(OperatorTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Parse snapshot bytes
pub fn parse_snapshot(bytes: &[u8]) -> Result<RawSnapshot, SnapshotError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Memory-map and parse a snapshot file
pub fn read_snapshot(path: &Path) -> Result<RawSnapshot, SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let len = file.metadata().map_err(io_err)?.len();
    if len == 0 {
        // Zero-length files cannot be mapped on every platform
        return parse_snapshot(&[]);
    }

    // SAFETY: the snapshot is an immutable generated asset; it is only read
    // for the duration of parsing and never modified while mapped.
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_err)?;
    parse_snapshot(&mmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let json = r#"{
            "version": "v1",
            "operators": {
                "b oil llc": {"name": "B OIL LLC", "status": "OPEN"},
                "a oil llc": {"name": "A OIL LLC", "status": "OPEN"},
                "b oil llc": {"name": "B OIL LLC (dup)", "status": "OPEN"}
            }
        }"#;
        let raw = parse_snapshot(json.as_bytes()).unwrap();
        let keys: Vec<&str> = raw.operators.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b oil llc", "a oil llc", "b oil llc"]);
        assert_eq!(raw.meta().version.as_deref(), Some("v1"));
        assert_eq!(raw.meta().generated_at, None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            parse_snapshot(b"{\"operators\": [1, 2]}"),
            Err(SnapshotError::Parse(_))
        ));
        assert!(matches!(parse_snapshot(b""), Err(SnapshotError::Parse(_))));
        assert!(matches!(
            parse_snapshot(b"{\"operators\": {\"x\": {\"phone\": null}}}"),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_status() {
        let json = br#"{"operators": {"ghost oil llc": {"name": "GHOST OIL LLC"}}}"#;
        assert!(matches!(parse_snapshot(json), Err(SnapshotError::Parse(_))));

        let json = br#"{"operators": {
            "ghost oil llc": {"name": "GHOST OIL LLC", "status": null}
        }}"#;
        assert!(matches!(parse_snapshot(json), Err(SnapshotError::Parse(_))));
    }

    #[test]
    fn test_read_mapped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operators.json");
        std::fs::write(
            &path,
            r#"{"generatedAt": "2024-06-01", "operators": {
                "acme oil llc": {"name": "ACME OIL LLC", "status": "OPEN"}
            }}"#,
        )
        .unwrap();

        let raw = read_snapshot(&path).unwrap();
        assert_eq!(raw.operators.0.len(), 1);
        assert_eq!(raw.meta().generated_at.as_deref(), Some("2024-06-01"));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "").unwrap();
        assert!(matches!(read_snapshot(&empty), Err(SnapshotError::Parse(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_snapshot(Path::new("/nonexistent/operators.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
