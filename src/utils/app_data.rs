use crate::query::fuzzy::FuzzyParams;
use crate::query::scorer::ScoringWeights;
use crate::store::Status;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "oplookup";
const CONFIG_FILE: &str = "config.json";
const SNAPSHOT_FILE: &str = "operators.json";

/// Environment variable overriding the snapshot path
pub const SNAPSHOT_ENV: &str = "OPLOOKUP_SNAPSHOT";

/// Resolver configuration stored in the app config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Snapshot file to load. If None, `<data dir>/oplookup/operators.json`
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Maximum ambiguous candidates returned per query
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Minimum fuzzy score for a candidate to be returned
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f64,

    /// Minimum cheap similarity for a row to reach the edit-distance stage
    #[serde(default = "default_prefilter_threshold")]
    pub prefilter_threshold: f64,

    /// Share of query trigrams a key must contain to be gathered by trigrams
    #[serde(default = "default_min_trigram_share")]
    pub min_trigram_share: f64,

    /// Maximum rows scored with edit distance per query
    #[serde(default = "default_max_scored")]
    pub max_scored: usize,

    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Status filter applied when a query does not set one
    #[serde(default)]
    pub default_status_filter: Option<Status>,
}

fn default_max_candidates() -> usize {
    5
}

fn default_similarity_floor() -> f64 {
    0.55
}

fn default_prefilter_threshold() -> f64 {
    0.2
}

fn default_min_trigram_share() -> f64 {
    0.4
}

fn default_max_scored() -> usize {
    256
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            max_candidates: default_max_candidates(),
            similarity_floor: default_similarity_floor(),
            prefilter_threshold: default_prefilter_threshold(),
            min_trigram_share: default_min_trigram_share(),
            max_scored: default_max_scored(),
            scoring: ScoringWeights::default(),
            default_status_filter: None,
        }
    }
}

impl ResolverConfig {
    /// Load config from the app config directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ResolverConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Save config to the app config directory
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(config_path)
    }

    /// Clamp values into their valid ranges. Non-finite fractions fall
    /// back to the defaults.
    pub fn sanitized(mut self) -> Self {
        fn fraction(value: f64, default: f64) -> f64 {
            if value.is_finite() { value.clamp(0.0, 1.0) } else { default }
        }

        self.max_scored = self.max_scored.max(1);
        self.max_candidates = self.max_candidates.clamp(1, self.max_scored);
        self.similarity_floor = fraction(self.similarity_floor, default_similarity_floor());
        self.prefilter_threshold =
            fraction(self.prefilter_threshold, default_prefilter_threshold());
        self.min_trigram_share = fraction(self.min_trigram_share, default_min_trigram_share());
        self
    }

    /// Snapshot path: explicit argument, then `OPLOOKUP_SNAPSHOT`, then the
    /// configured path, then the default in the app data directory
    pub fn snapshot_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(SNAPSHOT_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.snapshot_path {
            return Ok(path.clone());
        }
        Ok(get_app_data_dir()?.join(SNAPSHOT_FILE))
    }

    /// Fuzzy finder parameters for one query
    pub fn fuzzy_params(&self, limit: usize, floor: f64) -> FuzzyParams {
        FuzzyParams {
            limit,
            floor,
            prefilter_threshold: self.prefilter_threshold,
            min_trigram_share: self.min_trigram_share,
            max_scored: self.max_scored,
        }
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_NAME).join(CONFIG_FILE))
}

/// Get the application data directory holding the default snapshot
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    Ok(base.join(APP_NAME))
}
