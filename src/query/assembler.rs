use crate::query::resolution::{MatchCandidate, Resolution};
use crate::query::topk::{rank_cmp, ScoredRow};
use crate::store::{RecordRef, RecordStore, RowId, Status};

/// Turns exact hits and scored rows into a [`Resolution`], applying the
/// status filter before deciding between found, ambiguous and not found.
pub struct ResultAssembler<'a> {
    store: &'a RecordStore,
    status_filter: Option<Status>,
    max_candidates: usize,
}

impl<'a> ResultAssembler<'a> {
    pub fn new(
        store: &'a RecordStore,
        status_filter: Option<Status>,
        max_candidates: usize,
    ) -> Self {
        Self {
            store,
            status_filter,
            max_candidates,
        }
    }

    #[inline]
    fn accepts(&self, record: &RecordRef<'_>) -> bool {
        self.status_filter.is_none_or(|s| record.status() == s)
    }

    /// Exact key hit; filtered out becomes `NotFound`
    pub fn found(&self, record: RecordRef<'a>) -> Resolution {
        if !self.accepts(&record) {
            return Resolution::NotFound;
        }
        Resolution::Found {
            key: record.key().to_string(),
            record: record.to_record(),
        }
    }

    /// Alias hit. A single row is an exact answer; a shared alias names
    /// several operators equally well and is reported as ambiguous.
    pub fn alias(&self, rows: &[RowId]) -> Resolution {
        if let [row] = rows {
            return match self.store.get(*row) {
                Some(record) => self.found(record),
                None => Resolution::NotFound,
            };
        }

        let mut scored: Vec<ScoredRow<'a>> = rows
            .iter()
            .filter_map(|&row| self.store.get(row))
            .map(|record| ScoredRow {
                row: record.row_id(),
                key: record.key(),
                score: 1.0,
            })
            .collect();
        scored.sort_by(rank_cmp);
        self.candidates(scored)
    }

    /// Ranked fuzzy rows, best first. Always ambiguous when non-empty.
    pub fn candidates(&self, rows: Vec<ScoredRow<'a>>) -> Resolution {
        let candidates: Vec<MatchCandidate> = rows
            .into_iter()
            .filter_map(|scored| {
                let record = self.store.get(scored.row)?;
                self.accepts(&record).then(|| MatchCandidate {
                    key: scored.key.to_string(),
                    record: record.to_record(),
                    score: scored.score,
                })
            })
            .take(self.max_candidates)
            .collect();

        if candidates.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::Ambiguous { candidates }
        }
    }
}
