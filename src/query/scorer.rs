//! Scoring for fuzzy operator-name candidates
//!
//! A candidate's score blends two signals:
//! - token overlap: weighted Jaccard over match-form tokens, where entity
//!   designators (`llc`, `inc`, `corp`, ...) weigh less than name tokens and
//!   prefix matches (`corp` / `corporation`) earn partial credit
//! - edit similarity: `1 - distance / max_len` from the bounded
//!   Damerau-Levenshtein distance
//!
//! Also provides the upper bound used to skip the distance computation for
//! candidates that cannot reach the current threshold.

use crate::normalize::is_designator;
use serde::{Deserialize, Serialize};

/// Shortest token that may match another token by prefix
pub const MIN_PREFIX_LEN: usize = 3;

/// Configurable weights for scoring factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of the token overlap component
    pub token_weight: f64,
    /// Weight of the edit similarity component
    pub edit_weight: f64,
    /// Token weight of entity designators relative to name tokens (1.0)
    pub designator_weight: f64,
    /// Credit for a token that matches another by prefix (exact match = 1.0)
    pub prefix_credit: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            token_weight: 0.5,
            edit_weight: 0.5,
            designator_weight: 0.25,
            prefix_credit: 0.75,
        }
    }
}

/// Score calculation context for a single candidate
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreContext {
    /// Weighted token overlap in [0, 1]
    pub token_overlap: f64,
    /// Edit distance between the compared forms, `None` past the cutoff
    pub distance: Option<usize>,
    /// Length in chars of the longer form
    pub max_len: usize,
}

/// Scorer calculates relevance scores for fuzzy candidates
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Create a scorer with default weights
    pub fn with_defaults() -> Self {
        Self::new(ScoringWeights::default())
    }

    /// Calculate the total score for a candidate, rounded to 6 decimals so
    /// that near-identical floats tie and fall through to the key order
    pub fn calculate_score(&self, ctx: &ScoreContext) -> f64 {
        let edit = edit_similarity(ctx.distance, ctx.max_len);
        let score = self.weights.token_weight * ctx.token_overlap + self.weights.edit_weight * edit;
        round_score(score.clamp(0.0, 1.0))
    }

    /// Maximum score reachable with the given token overlap (perfect edit similarity)
    #[inline]
    pub fn upper_bound(&self, token_overlap: f64) -> f64 {
        self.weights.token_weight * token_overlap + self.weights.edit_weight
    }

    /// Largest distance that still lets a candidate reach `target`.
    /// Returns `None` when `target` is out of reach even at distance 0.
    pub fn max_distance_for(
        &self,
        target: f64,
        token_overlap: f64,
        max_len: usize,
    ) -> Option<usize> {
        if self.weights.edit_weight <= 0.0 {
            return (self.upper_bound(token_overlap) >= target).then_some(max_len);
        }
        let needed =
            (target - self.weights.token_weight * token_overlap) / self.weights.edit_weight;
        if needed <= 0.0 {
            return Some(max_len);
        }
        if needed > 1.0 {
            return None;
        }
        let allowed = ((1.0 - needed) * max_len as f64 + 1e-9).floor();
        Some((allowed.max(0.0) as usize).min(max_len))
    }

    /// Weighted Jaccard overlap between query tokens and key tokens.
    ///
    /// Each query token credits its weight times the best match quality
    /// against any key token: 1.0 for an exact match, `prefix_credit` when
    /// one is a prefix of the other (shorter side at least
    /// [`MIN_PREFIX_LEN`] chars).
    pub fn token_overlap<'q, 'k, Q, K>(&self, query: Q, key: K) -> f64
    where
        Q: IntoIterator<Item = &'q str>,
        K: IntoIterator<Item = &'k str> + Clone,
    {
        let mut query_weight = 0.0;
        let mut intersection = 0.0;

        for q in query {
            let weight = self.token_weight(q);
            query_weight += weight;

            let mut best: f64 = 0.0;
            for k in key.clone() {
                if q == k {
                    best = 1.0;
                    break;
                }
                if is_prefix_match(q, k) {
                    best = best.max(self.weights.prefix_credit);
                }
            }
            intersection += weight * best;
        }

        let key_weight: f64 = key.into_iter().map(|k| self.token_weight(k)).sum();
        let intersection = intersection.min(query_weight).min(key_weight);
        let union = query_weight + key_weight - intersection;
        if union <= 0.0 { 0.0 } else { intersection / union }
    }

    #[inline]
    fn token_weight(&self, token: &str) -> f64 {
        if is_designator(token) {
            self.weights.designator_weight
        } else {
            1.0
        }
    }

    /// Get the weights (for external calculations)
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

/// `1 - distance / max_len`, or 0 when the distance was cut off
#[inline]
pub fn edit_similarity(distance: Option<usize>, max_len: usize) -> f64 {
    match distance {
        Some(_) if max_len == 0 => 1.0,
        Some(d) => 1.0 - (d.min(max_len) as f64 / max_len as f64),
        None => 0.0,
    }
}

#[inline]
pub fn round_score(score: f64) -> f64 {
    (score * 1_000_000.0).round() / 1_000_000.0
}

fn is_prefix_match(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.len() >= MIN_PREFIX_LEN && short.len() < long.len() && long.starts_with(short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<&str> {
        s.split(' ').collect()
    }

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::default();
        assert!(weights.token_weight > 0.0);
        assert!((weights.token_weight + weights.edit_weight - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_token_overlap_exact() {
        let scorer = Scorer::with_defaults();
        let q = toks("acme oil llc");
        assert_eq!(scorer.token_overlap(q.iter().copied(), q.iter().copied()), 1.0);

        let k = toks("zeta gas");
        assert_eq!(scorer.token_overlap(q.iter().copied(), k.iter().copied()), 0.0);
    }

    #[test]
    fn test_token_overlap_prefix_credit() {
        let scorer = Scorer::with_defaults();
        let q = toks("101 energy corp");
        let k = toks("101 energy corporation");
        let overlap = scorer.token_overlap(q.iter().copied(), k.iter().copied());
        // (1 + 1 + 0.25 * 0.75) / (2.25 + 2.25 - 2.1875)
        assert!((overlap - 2.1875 / 2.3125).abs() < 1e-9);
    }

    #[test]
    fn test_designators_weigh_less() {
        let scorer = Scorer::with_defaults();
        let missing_suffix = scorer.token_overlap(toks("acme oil"), toks("acme oil llc"));
        let missing_name = scorer.token_overlap(toks("acme llc"), toks("acme oil llc"));
        assert!(missing_suffix > missing_name);
    }

    #[test]
    fn test_short_tokens_no_prefix_credit() {
        let scorer = Scorer::with_defaults();
        // "co" is too short to prefix-match "company"
        let overlap = scorer.token_overlap(toks("co"), toks("company"));
        assert_eq!(overlap, 0.0);
    }

    #[test]
    fn test_calculate_score() {
        let scorer = Scorer::with_defaults();
        let perfect = scorer.calculate_score(&ScoreContext {
            token_overlap: 1.0,
            distance: Some(0),
            max_len: 10,
        });
        assert_eq!(perfect, 1.0);

        let cut_off = scorer.calculate_score(&ScoreContext {
            token_overlap: 0.5,
            distance: None,
            max_len: 10,
        });
        assert_eq!(cut_off, 0.25);
    }

    #[test]
    fn test_upper_bound_dominates_score() {
        let scorer = Scorer::with_defaults();
        for d in 0..=10 {
            let ctx = ScoreContext {
                token_overlap: 0.4,
                distance: Some(d),
                max_len: 10,
            };
            assert!(scorer.upper_bound(0.4) >= scorer.calculate_score(&ctx));
        }
    }

    #[test]
    fn test_max_distance_for() {
        let scorer = Scorer::with_defaults();
        // needed edit similarity = (0.8 - 0.5) / 0.5 = 0.6 -> d <= 4 of 10
        assert_eq!(scorer.max_distance_for(0.8, 1.0, 10), Some(4));
        // target already met by tokens alone
        assert_eq!(scorer.max_distance_for(0.3, 1.0, 10), Some(10));
        // unreachable
        assert_eq!(scorer.max_distance_for(0.9, 0.0, 10), None);
    }

    #[test]
    fn test_max_distance_consistent_with_score() {
        let scorer = Scorer::with_defaults();
        let target = 0.75;
        let overlap = 0.7;
        let max_len = 22;
        let allowed = scorer.max_distance_for(target, overlap, max_len).unwrap();

        let at = scorer.calculate_score(&ScoreContext {
            token_overlap: overlap,
            distance: Some(allowed),
            max_len,
        });
        let past = scorer.calculate_score(&ScoreContext {
            token_overlap: overlap,
            distance: Some(allowed + 1),
            max_len,
        });
        assert!(at >= target - 1e-6);
        assert!(past < target);
    }

    #[test]
    fn test_edit_similarity() {
        assert_eq!(edit_similarity(Some(0), 0), 1.0);
        assert_eq!(edit_similarity(Some(5), 10), 0.5);
        assert_eq!(edit_similarity(None, 10), 0.0);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.1234564), 0.123456);
        assert_eq!(round_score(0.1234566), 0.123457);
    }
}
