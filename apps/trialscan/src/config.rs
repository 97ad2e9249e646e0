//! Pipeline configuration
//!
//! Loaded from `trialscan.toml`:
//!
//! ```toml
//! inclusion_cutoff = "2020-01-01"
//! cord_since = "2020-01-01"
//! output_dir = "data"
//!
//! [sponsor_lookup]
//! key = "unique_spon_names"
//! value = "normed_spon_names"
//! report = "to_norm.csv"
//!
//! [intervention_lookup]
//! key = "trial_id"
//! report = "int_to_assess.csv"
//! ```
//!
//! Every key is optional, including those inside the lookup tables. Dates
//! are quoted strings.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "trialscan.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),
}

/// Sponsor sheet columns and where to report unnormalized names
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SponsorLookup {
    pub key: String,
    pub value: String,
    pub report: String,
}

impl Default for SponsorLookup {
    fn default() -> Self {
        Self {
            key: "unique_spon_names".to_string(),
            value: "normed_spon_names".to_string(),
            report: "to_norm.csv".to_string(),
        }
    }
}

/// Intervention sheet key column and where to report unassessed trials.
/// The curated columns are `study_category`, `intervention` and
/// `intervention_list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InterventionLookup {
    pub key: String,
    pub report: String,
}

impl Default for InterventionLookup {
    fn default() -> Self {
        Self {
            key: "trial_id".to_string(),
            report: "int_to_assess.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Earliest registration date of an included trial
    pub inclusion_cutoff: NaiveDate,
    /// Earliest publication date of a scanned CORD-19 document
    pub cord_since: NaiveDate,
    /// Directory for reports of unresolved lookups
    pub output_dir: PathBuf,
    pub sponsor_lookup: SponsorLookup,
    pub intervention_lookup: InterventionLookup,
}

fn start_of_2020() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inclusion_cutoff: start_of_2020(),
            cord_since: start_of_2020(),
            output_dir: PathBuf::from("."),
            sponsor_lookup: SponsorLookup::default(),
            intervention_lookup: InterventionLookup::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Load configuration from standard locations
    ///
    /// An explicit path must exist. Otherwise tries `./trialscan.toml`, then
    /// `~/.trialscan/trialscan.toml`, then falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".trialscan").join(CONFIG_FILE));
        }

        for path in candidates {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return Self::load_from(&path);
            }
        }

        Ok(Self::default())
    }

    /// Where an unresolved-lookup report is written
    pub fn report_path(&self, report: &str) -> PathBuf {
        self.output_dir.join(report)
    }
}
