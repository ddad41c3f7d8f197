use crate::normalize::split_aliases;
use crate::store::{RecordRef, RecordStore, RowId};

/// Outcome of an exact lookup
#[derive(Debug, Clone, Copy)]
pub enum ExactHit<'a> {
    /// The key is a primary key
    Key(RecordRef<'a>),
    /// The key is a DBA or `(the)` alias of one or more rows
    Alias(&'a [RowId]),
    Miss,
}

/// Exact key and alias resolution against one store
pub struct ExactResolver<'a> {
    store: &'a RecordStore,
}

impl<'a> ExactResolver<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// O(1) lookup of a canonical key. An empty key never matches.
    pub fn lookup(&self, key: &str) -> Option<RecordRef<'a>> {
        if key.is_empty() {
            return None;
        }
        self.store.lookup(key)
    }

    /// Rows known under an alias key
    pub fn lookup_alias(&self, key: &str) -> &'a [RowId] {
        if key.is_empty() {
            return &[];
        }
        self.store.alias_rows(key)
    }

    /// Primary key first, then aliases.
    ///
    /// A key carrying a DBA clause that misses as written is tried again in
    /// its `dba`-joined form, then by its legal part, then by each alias.
    pub fn resolve(&self, key: &str) -> ExactHit<'a> {
        let hit = self.resolve_one(key);
        if !matches!(hit, ExactHit::Miss) {
            return hit;
        }

        let parts = split_aliases(key);
        if parts.aliases.is_empty() {
            return ExactHit::Miss;
        }
        std::iter::once(parts.joined())
            .chain(std::iter::once(parts.legal))
            .chain(parts.aliases)
            .map(|part| self.resolve_one(&part))
            .find(|hit| !matches!(hit, ExactHit::Miss))
            .unwrap_or(ExactHit::Miss)
    }

    fn resolve_one(&self, key: &str) -> ExactHit<'a> {
        if let Some(record) = self.lookup(key) {
            return ExactHit::Key(record);
        }
        match self.lookup_alias(key) {
            [] => ExactHit::Miss,
            rows => ExactHit::Alias(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "operators": {
            "acme oil llc": {"name": "ACME OIL LLC", "status": "OPEN"},
            "acme oil llc dba acme energy": {
                "name": "ACME OIL LLC DBA ACME ENERGY",
                "status": "OPEN"
            },
            "zeta gas inc d/b/a acme energy": {
                "name": "ZETA GAS INC D/B/A ACME ENERGY",
                "status": "OPEN"
            },
            "orion production (the)": {"name": "ORION PRODUCTION (THE)", "status": "CANCELLED"},
            "kiowa land co": {"name": "KIOWA LAND CO", "status": "OPEN"}
        }
    }"#;

    #[test]
    fn test_primary_key() {
        let store = RecordStore::from_json_str(SNAPSHOT).unwrap();
        let exact = ExactResolver::new(&store);
        assert_eq!(exact.lookup("acme oil llc").unwrap().name(), "ACME OIL LLC");
        assert!(exact.lookup("").is_none());
        assert!(matches!(exact.resolve("acme oil llc"), ExactHit::Key(_)));
    }

    #[test]
    fn test_unique_alias() {
        let store = RecordStore::from_json_str(SNAPSHOT).unwrap();
        let exact = ExactResolver::new(&store);
        match exact.resolve("the orion production") {
            ExactHit::Alias(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(store.get(rows[0]).unwrap().key(), "orion production (the)");
            }
            other => panic!("expected alias hit, got {:?}", other),
        }
        assert_eq!(exact.lookup_alias("orion production").len(), 1);
    }

    #[test]
    fn test_shared_alias() {
        let store = RecordStore::from_json_str(SNAPSHOT).unwrap();
        let exact = ExactResolver::new(&store);
        assert_eq!(exact.lookup_alias("acme energy").len(), 2);
    }

    #[test]
    fn test_primary_key_shadows_alias() {
        // "acme oil llc" is both a key and the legal part of a DBA name
        let store = RecordStore::from_json_str(SNAPSHOT).unwrap();
        let exact = ExactResolver::new(&store);
        assert!(exact.lookup_alias("acme oil llc").is_empty());
        match exact.resolve("acme oil llc") {
            ExactHit::Key(r) => assert_eq!(r.row_id(), 0),
            other => panic!("expected key hit, got {:?}", other),
        }
    }

    #[test]
    fn test_query_with_other_dba_marker() {
        let store = RecordStore::from_json_str(SNAPSHOT).unwrap();
        let exact = ExactResolver::new(&store);

        match exact.resolve("acme oil llc d/b/a acme energy") {
            ExactHit::Key(r) => assert_eq!(r.key(), "acme oil llc dba acme energy"),
            other => panic!("expected key hit, got {:?}", other),
        }
        match exact.resolve("zeta gas inc, doing business as acme energy") {
            ExactHit::Alias(rows) => {
                assert_eq!(store.get(rows[0]).unwrap().key(), "zeta gas inc d/b/a acme energy");
            }
            other => panic!("expected alias hit, got {:?}", other),
        }
    }

    #[test]
    fn test_query_dba_parts() {
        let store = RecordStore::from_json_str(SNAPSHOT).unwrap();
        let exact = ExactResolver::new(&store);

        // Legal part is tried before the alias part
        match exact.resolve("kiowa land co dba acme energy") {
            ExactHit::Key(r) => assert_eq!(r.key(), "kiowa land co"),
            other => panic!("expected key hit, got {:?}", other),
        }
        match exact.resolve("unknown holdings dba kiowa land co") {
            ExactHit::Key(r) => assert_eq!(r.key(), "kiowa land co"),
            other => panic!("expected key hit, got {:?}", other),
        }
        assert!(matches!(exact.resolve("unknown holdings dba nobody"), ExactHit::Miss));
    }

    #[test]
    fn test_miss() {
        let store = RecordStore::from_json_str(SNAPSHOT).unwrap();
        let exact = ExactResolver::new(&store);
        assert!(matches!(exact.resolve("quantum widgets"), ExactHit::Miss));
        assert!(matches!(exact.resolve(""), ExactHit::Miss));
    }
}
