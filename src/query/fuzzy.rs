//! Fuzzy candidate finder.
//!
//! Runs only when exact and alias lookup miss. The pipeline per query:
//!
//! 1. **Gather** rows from the token dictionary (exact, prefix and reverse
//!    prefix token hits) and from the trigram index (rows sharing at least
//!    `min_trigram_share` of the query's trigrams).
//! 2. **Prefilter** each gathered row by `max(token_overlap, trigram_dice)`
//!    and keep the best `max_scored` rows above `prefilter_threshold`.
//! 3. **Score** survivors with the bounded edit distance, skipping rows whose
//!    upper bound cannot beat the similarity floor or the current top-k
//!    threshold, and keep the best `limit` in a [`TopKHeap`].
//!
//! Worst-case work per query is bounded by the key count for the prefilter
//! and by `max_scored` distance computations.

use crate::normalize::{is_designator, match_form, sorted_form, tokens};
use crate::query::distance::EditDistance;
use crate::query::scorer::{ScoreContext, Scorer, MIN_PREFIX_LEN};
use crate::query::topk::{ScoredRow, TopKHeap};
use crate::store::{RecordStore, RowId};
use crate::utils::trigram::{dice, form_trigrams, Trigram};
use rayon::prelude::*;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::trace;

/// Tolerance when comparing rounded scores against a bar
const SCORE_EPSILON: f64 = 1e-6;

/// Per-query fuzzy matching parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyParams {
    /// Maximum candidates returned
    pub limit: usize,
    /// Minimum score a candidate needs to be returned
    pub floor: f64,
    /// Minimum `max(token_overlap, trigram_dice)` to be scored at all
    pub prefilter_threshold: f64,
    /// Share of query trigrams a row must contain to be gathered by trigrams
    pub min_trigram_share: f64,
    /// Maximum rows passed to the edit-distance stage
    pub max_scored: usize,
}

impl Default for FuzzyParams {
    fn default() -> Self {
        Self {
            limit: 5,
            floor: 0.55,
            prefilter_threshold: 0.2,
            min_trigram_share: 0.4,
            max_scored: 256,
        }
    }
}

/// Counters from one `find` call, for debugging and tuning
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FinderStats {
    /// Rows gathered from token and trigram postings
    pub gathered: usize,
    /// Rows that passed the prefilter (after the `max_scored` cap)
    pub prefiltered: usize,
    /// Rows skipped because their upper bound could not reach the bar
    pub pruned: usize,
    /// Rows whose edit distance was computed
    pub scored: usize,
    /// Rows returned
    pub returned: usize,
}

/// Token dictionary entry
struct TokenEntry {
    token: Box<str>,
    rows: RoaringBitmap,
}

/// Precomputed comparison forms of one key
struct KeyForm {
    chars: Box<[char]>,
    sorted_chars: Box<[char]>,
    /// Indices into the token dictionary
    tokens: Box<[u32]>,
    trigram_count: u32,
}

/// Search structures over the key set of one [`RecordStore`]
pub struct FuzzyIndex {
    forms: Vec<KeyForm>,
    token_dict: Vec<TokenEntry>,
    trigrams: FxHashMap<Trigram, RoaringBitmap>,
}

/// Forms computed per row before the dictionaries exist
struct PendingForm {
    form: String,
    sorted: String,
    trigrams: Vec<Trigram>,
}

impl FuzzyIndex {
    /// Build the index for every key in the store
    pub fn build(store: &RecordStore) -> Self {
        let pending: Vec<PendingForm> = (0..store.len() as RowId)
            .into_par_iter()
            .map(|row| {
                let key = store.get(row).map(|r| r.key()).unwrap_or_default();
                let form = match_form(key);
                PendingForm {
                    sorted: sorted_form(&form),
                    trigrams: form_trigrams(&form),
                    form,
                }
            })
            .collect();

        // Sorted token dictionary (BTreeMap keeps the order for binary search)
        let mut token_postings: BTreeMap<&str, RoaringBitmap> = BTreeMap::new();
        let mut trigrams: FxHashMap<Trigram, RoaringBitmap> = FxHashMap::default();
        for (row, p) in pending.iter().enumerate() {
            for token in tokens(&p.form) {
                token_postings.entry(token).or_default().insert(row as u32);
            }
            for &t in &p.trigrams {
                trigrams.entry(t).or_default().insert(row as u32);
            }
        }

        let token_dict: Vec<TokenEntry> = token_postings
            .into_iter()
            .map(|(token, rows)| TokenEntry {
                token: token.into(),
                rows,
            })
            .collect();

        let forms = pending
            .par_iter()
            .map(|p| {
                let mut ids: Vec<u32> = tokens(&p.form)
                    .filter_map(|t| {
                        token_dict
                            .binary_search_by(|e| (*e.token).cmp(t))
                            .ok()
                            .map(|i| i as u32)
                    })
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                KeyForm {
                    chars: p.form.chars().collect(),
                    sorted_chars: p.sorted.chars().collect(),
                    tokens: ids.into_boxed_slice(),
                    trigram_count: p.trigrams.len() as u32,
                }
            })
            .collect();

        Self {
            forms,
            token_dict,
            trigrams,
        }
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Number of distinct tokens across all keys
    pub fn token_count(&self) -> usize {
        self.token_dict.len()
    }

    /// Number of distinct trigrams across all keys
    pub fn trigram_count(&self) -> usize {
        self.trigrams.len()
    }

    fn token_rows(&self, token: &str) -> Option<&RoaringBitmap> {
        self.token_dict
            .binary_search_by(|e| (*e.token).cmp(token))
            .ok()
            .map(|i| &self.token_dict[i].rows)
    }

    fn key_tokens(&self, row: RowId) -> impl Iterator<Item = &str> + Clone + '_ {
        self.forms[row as usize]
            .tokens
            .iter()
            .map(|&id| &*self.token_dict[id as usize].token)
    }

    /// Rows sharing a token with the query, directly or by prefix
    fn gather_by_tokens(&self, query_tokens: &[&str]) -> RoaringBitmap {
        let mut rows = RoaringBitmap::new();

        // Designators alone match a large share of all keys; only use them
        // when the query has nothing else
        let distinctive: Vec<&str> = query_tokens
            .iter()
            .copied()
            .filter(|t| !is_designator(t))
            .collect();
        let gather_from = if distinctive.is_empty() {
            query_tokens
        } else {
            &distinctive[..]
        };

        for &qt in gather_from {
            if let Some(posting) = self.token_rows(qt) {
                rows |= posting;
            }

            if qt.len() < MIN_PREFIX_LEN {
                continue;
            }

            // Key tokens extending the query token ("corp" -> "corporation")
            let start = self.token_dict.partition_point(|e| &*e.token < qt);
            for entry in self.token_dict[start..]
                .iter()
                .take_while(|e| e.token.starts_with(qt))
            {
                rows |= &entry.rows;
            }

            // Key tokens the query token extends ("corporation" -> "corp")
            for (end, _) in qt.char_indices().skip(MIN_PREFIX_LEN) {
                if let Some(posting) = self.token_rows(&qt[..end]) {
                    rows |= posting;
                }
            }
        }

        rows
    }

    /// Trigram hit counts per row
    fn trigram_hits(&self, query_trigrams: &[Trigram]) -> FxHashMap<RowId, u32> {
        let mut hits: FxHashMap<RowId, u32> = FxHashMap::default();
        for t in query_trigrams {
            if let Some(posting) = self.trigrams.get(t) {
                for row in posting {
                    *hits.entry(row).or_insert(0) += 1;
                }
            }
        }
        hits
    }

    /// Find the best fuzzy candidates for a normalized query key
    pub fn find<'s>(
        &self,
        store: &'s RecordStore,
        scorer: &Scorer,
        query_key: &str,
        params: &FuzzyParams,
    ) -> (Vec<ScoredRow<'s>>, FinderStats) {
        let mut stats = FinderStats::default();

        let query_form = match_form(query_key);
        if query_form.is_empty() || params.limit == 0 || self.is_empty() {
            return (Vec::new(), stats);
        }

        let mut query_tokens: Vec<&str> = Vec::new();
        for t in tokens(&query_form) {
            if !query_tokens.contains(&t) {
                query_tokens.push(t);
            }
        }
        let query_trigrams = form_trigrams(&query_form);

        // 1. Gather
        let mut gathered = self.gather_by_tokens(&query_tokens);
        let hits = self.trigram_hits(&query_trigrams);
        let min_hits =
            ((params.min_trigram_share * query_trigrams.len() as f64).ceil() as u32).max(1);
        for (&row, &count) in &hits {
            if count >= min_hits {
                gathered.insert(row);
            }
        }
        stats.gathered = gathered.len() as usize;

        // 2. Prefilter
        let mut prefiltered: Vec<(f64, RowId, f64)> = gathered
            .iter()
            .filter_map(|row| {
                let overlap =
                    scorer.token_overlap(query_tokens.iter().copied(), self.key_tokens(row));
                let shared = hits.get(&row).copied().unwrap_or(0) as usize;
                let tri = dice(
                    shared,
                    query_trigrams.len(),
                    self.forms[row as usize].trigram_count as usize,
                );
                let pre = overlap.max(tri);
                (pre >= params.prefilter_threshold).then_some((pre, row, overlap))
            })
            .collect();
        prefiltered.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        prefiltered.truncate(params.max_scored);
        stats.prefiltered = prefiltered.len();

        // 3. Score
        let query_chars: Vec<char> = query_form.chars().collect();
        let query_sorted: Vec<char> = sorted_form(&query_form).chars().collect();
        let mut distance = EditDistance::new();
        let mut top = TopKHeap::new(params.limit);

        for (_, row, overlap) in prefiltered {
            let bar = match top.threshold() {
                Some(t) => t.max(params.floor),
                None => params.floor,
            } - SCORE_EPSILON;

            if scorer.upper_bound(overlap) < bar {
                stats.pruned += 1;
                continue;
            }

            let form = &self.forms[row as usize];
            let max_len = query_chars.len().max(form.chars.len());
            let Some(cutoff) = scorer.max_distance_for(bar, overlap, max_len) else {
                stats.pruned += 1;
                continue;
            };

            stats.scored += 1;
            let direct = distance.bounded(&query_chars, &form.chars, cutoff);
            let reordered =
                distance.bounded(&query_sorted, &form.sorted_chars, direct.unwrap_or(cutoff));
            let best = match (direct, reordered) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };

            let score = scorer.calculate_score(&ScoreContext {
                token_overlap: overlap,
                distance: best,
                max_len,
            });
            if score + SCORE_EPSILON < params.floor {
                continue;
            }

            let Some(record) = store.get(row) else {
                continue;
            };
            top.try_insert(ScoredRow {
                row,
                key: record.key(),
                score,
            });
        }

        let results = top.into_sorted_vec();
        stats.returned = results.len();
        trace!(query = %query_key, ?stats, "Fuzzy search");
        (results, stats)
    }
}
