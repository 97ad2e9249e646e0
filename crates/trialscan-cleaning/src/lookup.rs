//! Manually curated lookup tables
//!
//! Sponsor names and intervention categories are assigned by hand in a
//! spreadsheet. Reconciling a batch against the table yields the resolved
//! values plus a report of everything still missing from the table. The
//! analyst updates the table from the report and reruns until the report
//! is empty.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::{CleaningError, Result};

/// Key -> curated value
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: HashMap<String, String>,
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<T = String> {
    /// One entry per input value, `None` where the table has no entry
    pub resolved: Vec<Option<T>>,
    /// Unresolved keys and how many records carry them
    pub unresolved: BTreeMap<String, usize>,
}

impl<T> Default for Reconciliation<T> {
    fn default() -> Self {
        Self {
            resolved: Vec::new(),
            unresolved: BTreeMap::new(),
        }
    }
}

/// Curated intervention columns of one trial
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InterventionAssessment {
    #[serde(default)]
    pub study_category: Option<String>,
    #[serde(default)]
    pub intervention: Option<String>,
    #[serde(default)]
    pub intervention_list: Option<String>,
}

impl InterventionAssessment {
    /// Both required columns are filled in
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.study_category) && filled(&self.intervention)
    }
}

/// Trial id -> curated intervention columns
#[derive(Debug, Clone, Default)]
pub struct InterventionTable {
    entries: HashMap<String, InterventionAssessment>,
}

#[derive(Debug, Serialize)]
struct UnresolvedRow<'a> {
    value: &'a str,
    count: usize,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load a table from CSV. Rows with an empty value are treated as not
    /// yet curated.
    pub fn from_csv(path: &Path, key_column: &str, value_column: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let positions = column_positions(&headers, &[key_column, value_column])?;

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let key = cell(&record, positions[0]);
            let value = cell(&record, positions[1]);
            if let (Some(key), Some(value)) = (key, value) {
                entries.insert(key, value);
            }
        }

        tracing::info!("Loaded {} lookup entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a batch of keys against the table
    pub fn reconcile<'a, I>(&self, keys: I) -> Reconciliation
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut result = Reconciliation::default();
        for key in keys {
            let value = self.get(key).map(str::to_string);
            if value.is_none() {
                *result.unresolved.entry(key.to_string()).or_insert(0) += 1;
            }
            result.resolved.push(value);
        }
        result
    }
}

/// Position of each named column in a CSV header
fn column_positions(headers: &csv::StringRecord, names: &[&str]) -> Result<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == *name)
                .ok_or_else(|| CleaningError::ColumnNotFound(name.to_string()))
        })
        .collect()
}

/// Cell text, `None` when empty
fn cell(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl InterventionTable {
    pub const VALUE_COLUMNS: [&'static str; 3] =
        ["study_category", "intervention", "intervention_list"];

    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, InterventionAssessment)>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Load the intervention sheet. Rows are kept even when partly filled.
    pub fn from_csv(path: &Path, key_column: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let mut names = vec![key_column];
        names.extend(Self::VALUE_COLUMNS);
        let positions = column_positions(&headers, &names)?;

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let Some(key) = cell(&record, positions[0]) else {
                continue;
            };
            entries.insert(
                key,
                InterventionAssessment {
                    study_category: cell(&record, positions[1]),
                    intervention: cell(&record, positions[2]),
                    intervention_list: cell(&record, positions[3]),
                },
            );
        }

        tracing::info!(
            "Loaded {} intervention assessments from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    pub fn get(&self, trial_id: &str) -> Option<&InterventionAssessment> {
        self.entries.get(trial_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a batch of trial ids. A trial is unresolved when it is
    /// missing from the table or lacks a category or intervention; partial
    /// entries are still returned.
    pub fn reconcile<'a, I>(&self, trial_ids: I) -> Reconciliation<InterventionAssessment>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut result = Reconciliation::default();
        for trial_id in trial_ids {
            let entry = self.get(trial_id).cloned();
            if !entry.as_ref().is_some_and(InterventionAssessment::is_complete) {
                *result.unresolved.entry(trial_id.to_string()).or_insert(0) += 1;
            }
            result.resolved.push(entry);
        }
        result
    }
}

impl<T> Reconciliation<T> {
    /// Every key resolved
    pub fn is_converged(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Write the unresolved report as `value,count` CSV
    pub fn write_unresolved(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (value, count) in &self.unresolved {
            writer.serialize(UnresolvedRow {
                value,
                count: *count,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
