//! Public result types of a resolution

use crate::store::{OperatorRecord, Status};
use serde::{Deserialize, Serialize};

/// One ranked fuzzy (or shared-alias) candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub key: String,
    pub record: OperatorRecord,
    pub score: f64,
}

/// Outcome of resolving one query. Exactly one variant per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// The query named exactly one operator
    Found { key: String, record: OperatorRecord },
    /// Ranked candidates, best first; never empty
    Ambiguous { candidates: Vec<MatchCandidate> },
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Found { .. } => "found",
            Resolution::Ambiguous { .. } => "ambiguous",
            Resolution::NotFound => "not_found",
        }
    }

    /// Candidates of an ambiguous result (empty otherwise)
    pub fn candidates(&self) -> &[MatchCandidate] {
        match self {
            Resolution::Ambiguous { candidates } => candidates,
            _ => &[],
        }
    }
}

/// Per-call overrides; `None` falls back to the service configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOptions {
    /// Only records with this status may be returned
    pub status_filter: Option<Status>,
    /// Maximum number of ambiguous candidates
    pub max_candidates: Option<usize>,
    /// Minimum fuzzy score in `0.0..=1.0`
    pub similarity_floor: Option<f64>,
}

impl ResolveOptions {
    pub fn with_status(mut self, status: Status) -> Self {
        self.status_filter = Some(status);
        self
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.similarity_floor = Some(floor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> OperatorRecord {
        OperatorRecord {
            name: "47 OIL COMPANY LLC".to_string(),
            phone: Some("(580) 555-0147".to_string()),
            address: None,
            city: None,
            state: Some("OK".to_string()),
            zip: None,
            contact_name: None,
            status: Status::Open,
        }
    }

    #[test]
    fn test_found_json_shape() {
        let res = Resolution::Found {
            key: "47 oil company llc".to_string(),
            record: record(),
        };
        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(value["kind"], "found");
        assert_eq!(value["key"], "47 oil company llc");
        assert!(value["record"]["address"].is_null());
        assert_eq!(value["record"]["status"], "OPEN");
    }

    #[test]
    fn test_not_found_json_shape() {
        let json = serde_json::to_string(&Resolution::NotFound).unwrap();
        assert_eq!(json, r#"{"kind":"not_found"}"#);
    }

    #[test]
    fn test_ambiguous_parses_back() {
        let res = Resolution::Ambiguous {
            candidates: vec![MatchCandidate {
                key: "47 oil company llc".to_string(),
                record: record(),
                score: 0.75,
            }],
        };
        let json = serde_json::to_string(&res).unwrap();
        let parsed: Resolution = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, res);
        assert_eq!(parsed.kind(), "ambiguous");
        assert_eq!(parsed.candidates().len(), 1);
    }
}
