//! Regular-expression matching over document text

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{PatternError, Result};

/// Which of the three pattern lists a pattern belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Full registry ID shapes
    Exact,
    /// Bare registry prefixes
    Prefix,
    /// Registry names in prose
    RegistryName,
}

impl PatternKind {
    pub const ALL: [PatternKind; 3] = [
        PatternKind::Exact,
        PatternKind::Prefix,
        PatternKind::RegistryName,
    ];
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    registry: Option<String>,
    regex: Regex,
}

/// A located match, with the registry that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMatch {
    pub registry: Option<String>,
    pub kind: PatternKind,
    pub value: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// An ordered list of compiled patterns
#[derive(Debug, Clone)]
pub struct PatternList {
    kind: PatternKind,
    patterns: Vec<CompiledPattern>,
}

impl PatternList {
    /// Compile a list of pattern strings.
    ///
    /// Fails on the first structurally invalid pattern.
    pub fn compile<S: AsRef<str>>(kind: PatternKind, sources: &[S]) -> Result<Self> {
        let patterns = sources
            .iter()
            .map(|s| compile_one(None, s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { kind, patterns })
    }

    /// Compile `(registry label, pattern)` pairs
    pub fn compile_labelled(kind: PatternKind, sources: &[(&str, &str)]) -> Result<Self> {
        let patterns = sources
            .iter()
            .map(|(label, s)| compile_one(Some(*label), s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { kind, patterns })
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every non-overlapping match of every pattern, accumulated in list
    /// order.
    ///
    /// Returns `None` when the text is absent or empty, or when nothing
    /// matches.
    pub fn find_all(&self, text: Option<&str>) -> Option<Vec<String>> {
        let text = text.filter(|t| !t.is_empty())?;
        let hits: Vec<String> = self
            .patterns
            .iter()
            .flat_map(|p| p.regex.find_iter(text).map(|m| m.as_str().to_string()))
            .collect();
        if hits.is_empty() {
            None
        } else {
            Some(hits)
        }
    }

    /// Like [`find_all`](Self::find_all) but keeps positions and registry
    /// labels, sorted by position
    pub fn locate(&self, text: &str) -> Vec<RegistryMatch> {
        let mut results: Vec<RegistryMatch> = self
            .patterns
            .iter()
            .flat_map(|p| {
                p.regex.find_iter(text).map(move |m| RegistryMatch {
                    registry: p.registry.clone(),
                    kind: self.kind,
                    value: m.as_str().to_string(),
                    start_index: m.start(),
                    end_index: m.end(),
                })
            })
            .collect();
        results.sort_by_key(|r| (r.start_index, r.end_index));
        results
    }
}

fn compile_one(registry: Option<&str>, source: &str) -> Result<CompiledPattern> {
    let regex = Regex::new(source).map_err(|e| PatternError::Invalid {
        pattern: source.to_string(),
        message: e.to_string(),
    })?;
    Ok(CompiledPattern {
        registry: registry.map(str::to_string),
        regex,
    })
}

/// Search `to_search` with every pattern in `patterns`.
///
/// `None` is the "no matches" sentinel.
pub fn search_text(patterns: &PatternList, to_search: Option<&str>) -> Option<Vec<String>> {
    patterns.find_all(to_search)
}
