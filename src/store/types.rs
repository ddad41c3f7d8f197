use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row position in the record table
pub type RowId = u32;

/// Regulatory status of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Open,
    Cancelled,
    Suspended,
    Inactive,
    /// Any status string this build does not know about
    #[serde(other)]
    Unknown,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Open,
        Status::Cancelled,
        Status::Suspended,
        Status::Inactive,
        Status::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::Cancelled => "CANCELLED",
            Status::Suspended => "SUSPENDED",
            Status::Inactive => "INACTIVE",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Status::Open),
            "CANCELLED" | "CANCELED" => Ok(Status::Cancelled),
            "SUSPENDED" => Ok(Status::Suspended),
            "INACTIVE" => Ok(Status::Inactive),
            "UNKNOWN" => Ok(Status::Unknown),
            other => Err(format!("unknown operator status: {}", other)),
        }
    }
}

/// Contact record for one operator, as exposed to callers.
///
/// Optional fields stay `None` when the snapshot has `null`; they are never
/// coerced to empty strings. `status` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorRecord {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    pub status: Status,
}

/// Snapshot provenance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}
