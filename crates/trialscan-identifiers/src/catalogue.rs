//! Compiled registry catalogue and per-document scanning

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::registry::pattern_sources;
use crate::{PatternKind, PatternList, RegistryMatch, Result};

lazy_static! {
    // Fixed patterns, covered by the tests below
    static ref CATALOGUE: Catalogue = Catalogue::compile().unwrap();
}

/// The three compiled pattern lists
#[derive(Debug, Clone)]
pub struct Catalogue {
    exact: PatternList,
    prefixes: PatternList,
    registry_names: PatternList,
}

/// Hits of the three pattern lists in one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHits {
    pub id_hits: Option<Vec<String>>,
    pub prefix_hits: Option<Vec<String>>,
    pub reg_name_hits: Option<Vec<String>>,
}

impl DocumentHits {
    /// True when any of the three lists found something
    pub fn has_any(&self) -> bool {
        self.id_hits.is_some() || self.prefix_hits.is_some() || self.reg_name_hits.is_some()
    }

    pub fn get(&self, kind: PatternKind) -> Option<&[String]> {
        match kind {
            PatternKind::Exact => self.id_hits.as_deref(),
            PatternKind::Prefix => self.prefix_hits.as_deref(),
            PatternKind::RegistryName => self.reg_name_hits.as_deref(),
        }
    }
}

impl Catalogue {
    /// Compile the registry table
    pub fn compile() -> Result<Self> {
        Ok(Self {
            exact: PatternList::compile_labelled(
                PatternKind::Exact,
                &pattern_sources(PatternKind::Exact),
            )?,
            prefixes: PatternList::compile_labelled(
                PatternKind::Prefix,
                &pattern_sources(PatternKind::Prefix),
            )?,
            registry_names: PatternList::compile_labelled(
                PatternKind::RegistryName,
                &pattern_sources(PatternKind::RegistryName),
            )?,
        })
    }

    pub fn list(&self, kind: PatternKind) -> &PatternList {
        match kind {
            PatternKind::Exact => &self.exact,
            PatternKind::Prefix => &self.prefixes,
            PatternKind::RegistryName => &self.registry_names,
        }
    }

    /// Apply all three lists to one document
    pub fn scan(&self, text: Option<&str>) -> DocumentHits {
        DocumentHits {
            id_hits: self.exact.find_all(text),
            prefix_hits: self.prefixes.find_all(text),
            reg_name_hits: self.registry_names.find_all(text),
        }
    }

    /// Every match of every list with positions, sorted by position
    pub fn locate(&self, text: &str) -> Vec<RegistryMatch> {
        let mut results: Vec<RegistryMatch> = PatternKind::ALL
            .iter()
            .flat_map(|kind| self.list(*kind).locate(text))
            .collect();
        results.sort_by_key(|r| (r.start_index, r.end_index));
        results
    }
}

/// The process-wide compiled catalogue
pub fn catalogue() -> &'static Catalogue {
    &CATALOGUE
}

/// Compiled exact-ID list
pub fn ids_exact() -> &'static PatternList {
    CATALOGUE.list(PatternKind::Exact)
}

/// Compiled prefix list
pub fn prefixes() -> &'static PatternList {
    CATALOGUE.list(PatternKind::Prefix)
}

/// Compiled registry-name list
pub fn registry_names() -> &'static PatternList {
    CATALOGUE.list(PatternKind::RegistryName)
}

/// Scan a document with the registry catalogue
pub fn scan_document(text: Option<&str>) -> DocumentHits {
    CATALOGUE.scan(text)
}
