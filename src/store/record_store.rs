use crate::normalize::{alias_keys, normalize_key};
use crate::store::arena::{Span, StringArena};
use crate::store::loader::{parse_snapshot, read_snapshot, RawSnapshot, SnapshotError};
use crate::store::types::{OperatorRecord, RowId, SnapshotMeta, Status};
use ahash::AHashMap;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fixed seeds so key hashes are identical across processes and runs
const KEY_HASH_SEEDS: [u64; 4] = [
    0x6f70_6c6f_6f6b_7570,
    0x9e37_79b9_7f4a_7c15,
    0xbf58_476d_1ce4_e5b9,
    0x94d0_49bb_1331_11eb,
];

/// One row of the flat record table
#[derive(Debug, Clone, Copy)]
struct Row {
    key: Span,
    name: Span,
    phone: Option<Span>,
    address: Option<Span>,
    city: Option<Span>,
    state: Option<Span>,
    zip: Option<Span>,
    contact_name: Option<Span>,
    status: Status,
}

/// Immutable operator table loaded from one snapshot.
///
/// Strings live in a single arena; the key index maps a key hash to the
/// first row with that hash and collisions are chained through `next`.
pub struct RecordStore {
    meta: SnapshotMeta,
    arena: StringArena,
    rows: Vec<Row>,
    index: FxHashMap<u64, RowId>,
    next: Vec<Option<RowId>>,
    hasher: ahash::RandomState,
    aliases: AHashMap<String, Vec<RowId>>,
}

impl RecordStore {
    /// Load and validate a snapshot file
    pub fn open(path: &Path) -> Result<Self, SnapshotError> {
        let start = Instant::now();
        let raw = read_snapshot(path)?;
        let store = Self::from_raw(raw)?;
        info!(
            path = %path.display(),
            rows = store.len(),
            aliases = store.alias_count(),
            version = store.meta.version.as_deref().unwrap_or("-"),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded operator snapshot"
        );
        Ok(store)
    }

    /// Build a store from snapshot JSON bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Self::from_raw(parse_snapshot(bytes)?)
    }

    /// Build a store from snapshot JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Self::from_json_slice(json.as_bytes())
    }

    pub fn from_raw(raw: RawSnapshot) -> Result<Self, SnapshotError> {
        let meta = raw.meta();
        Self::from_entries(meta, raw.operators.0)
    }

    /// Build a store from `(key, record)` pairs.
    ///
    /// Every key must be non-empty, unique and already canonical; every
    /// record must have a non-empty name.
    pub fn from_entries(
        meta: SnapshotMeta,
        entries: Vec<(String, OperatorRecord)>,
    ) -> Result<Self, SnapshotError> {
        if entries.len() >= RowId::MAX as usize {
            return Err(SnapshotError::TooLarge);
        }

        let approx_bytes: usize = entries
            .iter()
            .map(|(k, r)| k.len() + r.name.len() + 64)
            .sum();

        let mut store = Self {
            meta,
            arena: StringArena::with_capacity(approx_bytes),
            rows: Vec::with_capacity(entries.len()),
            index: FxHashMap::default(),
            next: Vec::with_capacity(entries.len()),
            hasher: ahash::RandomState::with_seeds(
                KEY_HASH_SEEDS[0],
                KEY_HASH_SEEDS[1],
                KEY_HASH_SEEDS[2],
                KEY_HASH_SEEDS[3],
            ),
            aliases: AHashMap::new(),
        };
        store.index.reserve(entries.len());

        for (key, record) in entries {
            store.insert(key, record)?;
        }

        store.arena.shrink_to_fit();
        store.build_aliases();
        Ok(store)
    }

    fn insert(&mut self, key: String, record: OperatorRecord) -> Result<(), SnapshotError> {
        if key.is_empty() {
            return Err(SnapshotError::EmptyKey);
        }
        let expected = normalize_key(&key);
        if expected != key {
            return Err(SnapshotError::NonCanonicalKey { key, expected });
        }
        if record.name.trim().is_empty() {
            return Err(SnapshotError::EmptyName(key));
        }
        if self.row_id(&key).is_some() {
            return Err(SnapshotError::DuplicateKey(key));
        }

        let row = Row {
            key: self.intern(&key)?,
            name: self.intern(&record.name)?,
            phone: self.intern_opt(record.phone.as_deref())?,
            address: self.intern_opt(record.address.as_deref())?,
            city: self.intern_opt(record.city.as_deref())?,
            state: self.intern_opt(record.state.as_deref())?,
            zip: self.intern_opt(record.zip.as_deref())?,
            contact_name: self.intern_opt(record.contact_name.as_deref())?,
            status: record.status,
        };

        let row_id = self.rows.len() as RowId;
        let hash = self.hasher.hash_one(key.as_str());
        let previous = self.index.insert(hash, row_id);
        self.next.push(previous);
        self.rows.push(row);
        Ok(())
    }

    fn intern(&mut self, s: &str) -> Result<Span, SnapshotError> {
        self.arena.push(s).ok_or(SnapshotError::TooLarge)
    }

    fn intern_opt(&mut self, s: Option<&str>) -> Result<Option<Span>, SnapshotError> {
        s.map(|s| self.intern(s)).transpose()
    }

    /// Index DBA names and `(the)` variants. A primary key always wins over
    /// an alias with the same text.
    fn build_aliases(&mut self) {
        let mut aliases: AHashMap<String, Vec<RowId>> = AHashMap::new();

        for row_id in 0..self.rows.len() as RowId {
            let row = self.rows[row_id as usize];
            let key = self.arena.get(row.key);
            let name = self.arena.get(row.name);

            for alias in alias_keys(key, name) {
                if self.row_id(&alias).is_some() {
                    debug!(alias = %alias, key = %key, "Alias shadowed by primary key");
                    continue;
                }
                let rows = aliases.entry(alias).or_default();
                if !rows.contains(&row_id) {
                    rows.push(row_id);
                }
            }
        }

        let shared = aliases.values().filter(|rows| rows.len() > 1).count();
        if shared > 0 {
            warn!(shared, "Some alias names map to more than one operator");
        }

        self.aliases = aliases;
    }

    /// Row for an exact canonical key
    pub fn row_id(&self, key: &str) -> Option<RowId> {
        if key.is_empty() {
            return None;
        }
        let hash = self.hasher.hash_one(key);
        let mut cursor = self.index.get(&hash).copied();
        while let Some(row_id) = cursor {
            let row = &self.rows[row_id as usize];
            if self.arena.get(row.key) == key {
                return Some(row_id);
            }
            cursor = self.next[row_id as usize];
        }
        None
    }

    /// Exact canonical key lookup
    pub fn lookup(&self, key: &str) -> Option<RecordRef<'_>> {
        self.row_id(key).map(|row| RecordRef { store: self, row })
    }

    /// Rows registered under an alias key (empty when none)
    pub fn alias_rows(&self, key: &str) -> &[RowId] {
        self.aliases.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, row: RowId) -> Option<RecordRef<'_>> {
        if (row as usize) < self.rows.len() {
            Some(RecordRef { store: self, row })
        } else {
            None
        }
    }

    /// Records in snapshot order
    pub fn iter(&self) -> impl Iterator<Item = RecordRef<'_>> + '_ {
        (0..self.rows.len() as RowId).map(move |row| RecordRef { store: self, row })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn meta(&self) -> &SnapshotMeta {
        &self.meta
    }

    /// Bytes held by the string arena
    pub fn arena_bytes(&self) -> usize {
        self.arena.len()
    }

    /// Record counts per status, in `Status::ALL` order
    pub fn status_counts(&self) -> Vec<(Status, usize)> {
        Status::ALL
            .iter()
            .map(|&status| {
                let count = self.rows.iter().filter(|r| r.status == status).count();
                (status, count)
            })
            .collect()
    }
}

/// Borrowed view of one row
#[derive(Clone, Copy)]
pub struct RecordRef<'a> {
    store: &'a RecordStore,
    row: RowId,
}

impl<'a> RecordRef<'a> {
    #[inline]
    fn row_data(&self) -> &'a Row {
        &self.store.rows[self.row as usize]
    }

    #[inline]
    fn opt(&self, span: Option<Span>) -> Option<&'a str> {
        span.map(|s| self.store.arena.get(s))
    }

    pub fn row_id(&self) -> RowId {
        self.row
    }

    pub fn key(&self) -> &'a str {
        self.store.arena.get(self.row_data().key)
    }

    pub fn name(&self) -> &'a str {
        self.store.arena.get(self.row_data().name)
    }

    pub fn phone(&self) -> Option<&'a str> {
        self.opt(self.row_data().phone)
    }

    pub fn address(&self) -> Option<&'a str> {
        self.opt(self.row_data().address)
    }

    pub fn city(&self) -> Option<&'a str> {
        self.opt(self.row_data().city)
    }

    pub fn state(&self) -> Option<&'a str> {
        self.opt(self.row_data().state)
    }

    pub fn zip(&self) -> Option<&'a str> {
        self.opt(self.row_data().zip)
    }

    pub fn contact_name(&self) -> Option<&'a str> {
        self.opt(self.row_data().contact_name)
    }

    pub fn status(&self) -> Status {
        self.row_data().status
    }

    /// Owned copy of the record for a public result
    pub fn to_record(&self) -> OperatorRecord {
        OperatorRecord {
            name: self.name().to_string(),
            phone: self.phone().map(str::to_string),
            address: self.address().map(str::to_string),
            city: self.city().map(str::to_string),
            state: self.state().map(str::to_string),
            zip: self.zip().map(str::to_string),
            contact_name: self.contact_name().map(str::to_string),
            status: self.status(),
        }
    }
}

impl std::fmt::Debug for RecordRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordRef")
            .field("row", &self.row)
            .field("key", &self.key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> OperatorRecord {
        OperatorRecord {
            name: name.to_string(),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip: None,
            contact_name: None,
            status: Status::Open,
        }
    }

    fn store(entries: &[(&str, &str)]) -> Result<RecordStore, SnapshotError> {
        RecordStore::from_entries(
            SnapshotMeta::default(),
            entries
                .iter()
                .map(|(k, n)| (k.to_string(), record(n)))
                .collect(),
        )
    }

    #[test]
    fn test_lookup_exact() {
        let store = store(&[
            ("101 energy corporation", "101 ENERGY CORPORATION"),
            ("47 oil company llc", "47 OIL COMPANY LLC"),
        ])
        .unwrap();

        let hit = store.lookup("101 energy corporation").unwrap();
        assert_eq!(hit.name(), "101 ENERGY CORPORATION");
        assert_eq!(hit.row_id(), 0);
        assert!(store.lookup("101 energy corp").is_none());
        assert!(store.lookup("").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_optional_fields_stay_none() {
        let mut rec = record("47 OIL COMPANY LLC");
        rec.phone = Some("(580) 555-0147".to_string());
        rec.address = None;
        rec.city = Some(String::new());
        let entries = vec![("47 oil company llc".to_string(), rec)];
        let store = RecordStore::from_entries(SnapshotMeta::default(), entries).unwrap();

        let hit = store.lookup("47 oil company llc").unwrap();
        assert_eq!(hit.address(), None);
        assert_eq!(hit.city(), Some(""));
        assert_eq!(hit.to_record().phone.as_deref(), Some("(580) 555-0147"));
    }

    #[test]
    fn test_rejects_duplicate_key() {
        let err = store(&[("a oil", "A OIL"), ("a oil", "A OIL")]).err().unwrap();
        assert!(matches!(err, SnapshotError::DuplicateKey(k) if k == "a oil"));
    }

    #[test]
    fn test_rejects_non_canonical_key() {
        let err = store(&[("A Oil", "A OIL")]).err().unwrap();
        assert!(matches!(
            err,
            SnapshotError::NonCanonicalKey { expected, .. } if expected == "a oil"
        ));

        let err = store(&[("a  oil", "A OIL")]).err().unwrap();
        assert!(matches!(err, SnapshotError::NonCanonicalKey { .. }));
    }

    #[test]
    fn test_rejects_empty_key_and_name() {
        assert!(matches!(store(&[("", "X")]).err().unwrap(), SnapshotError::EmptyKey));
        assert!(matches!(store(&[("x", "  ")]).err().unwrap(), SnapshotError::EmptyName(_)));
    }

    #[test]
    fn test_aliases() {
        let store = store(&[
            ("smith holdings llc dba smith oil", "SMITH HOLDINGS LLC DBA SMITH OIL"),
            ("smith oil", "SMITH OIL"),
            ("jones corp dba jj oil", "JONES CORP DBA JJ OIL"),
            ("jj partners dba jj oil", "JJ PARTNERS DBA JJ OIL"),
        ])
        .unwrap();

        // Primary key wins over alias with the same text
        assert!(store.alias_rows("smith oil").is_empty());
        assert_eq!(store.alias_rows("smith holdings llc"), &[0]);
        assert_eq!(store.alias_rows("jj oil"), &[2, 3]);
        assert!(store.alias_rows("nothing").is_empty());
    }

    #[test]
    fn test_iter_and_status_counts() {
        let mut closed = record("OLD OIL");
        closed.status = Status::Cancelled;
        let store = RecordStore::from_entries(
            SnapshotMeta::default(),
            vec![("new oil".into(), record("NEW OIL")), ("old oil".into(), closed)],
        )
        .unwrap();

        let keys: Vec<&str> = store.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["new oil", "old oil"]);

        let counts = store.status_counts();
        assert_eq!(counts[0], (Status::Open, 1));
        assert_eq!(counts[1], (Status::Cancelled, 1));
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{"operators": {"a oil": {"name": "A OIL", "status": "SUSPENDED"}}}"#;
        let store = RecordStore::from_json_str(json).unwrap();
        assert_eq!(store.lookup("a oil").unwrap().status(), Status::Suspended);

        let missing = r#"{"operators": {"ghost oil llc": {"name": "GHOST OIL LLC"}}}"#;
        assert!(matches!(
            RecordStore::from_json_str(missing),
            Err(SnapshotError::Parse(_))
        ));
    }
}
