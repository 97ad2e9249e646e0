//! CORD-19 document parses and metadata

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use trialscan_identifiers::{scan_document, DocumentHits};

use crate::{Result, ScreeningError, SearchRecord, Source};

/// A CORD-19 JSON document parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CordDocument {
    pub paper_id: String,
    pub source: Source,
    /// The whole JSON file, scanned as is
    pub text: String,
}

#[derive(Deserialize)]
struct PaperId {
    paper_id: String,
}

impl CordDocument {
    pub fn load(path: &Path, source: Source) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let parsed: PaperId =
            serde_json::from_str(&text).map_err(|e| ScreeningError::InvalidDocument {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            paper_id: parsed.paper_id,
            source,
            text,
        })
    }

    pub fn scan(&self) -> DocumentHits {
        scan_document(Some(&self.text))
    }
}

/// One row of the CORD-19 `metadata.csv`. Unused columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CordMetadata {
    pub cord_uid: String,
    /// One or more `; `-separated SHA1s of the PDF parses
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub pmcid: Option<String>,
    #[serde(default)]
    pub pubmed_id: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub publish_time: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl CordMetadata {
    /// Publication date. Year-only values map to 1 January.
    pub fn published(&self) -> Option<NaiveDate> {
        let raw = self.publish_time.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
            raw.parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        })
    }
}

/// Metadata indexed by the file stems of the document parses
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    rows: Vec<CordMetadata>,
    by_sha: HashMap<String, usize>,
    by_pmcid: HashMap<String, usize>,
    by_cord_uid: HashMap<String, usize>,
}

impl MetadataIndex {
    pub fn new(rows: Vec<CordMetadata>) -> Self {
        let mut by_sha = HashMap::new();
        let mut by_pmcid = HashMap::new();
        let mut by_cord_uid = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            by_cord_uid.entry(row.cord_uid.clone()).or_insert(i);
            if let Some(shas) = row.sha.as_deref() {
                for sha in shas.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                    by_sha.entry(sha.to_string()).or_insert(i);
                }
            }
            if let Some(pmcid) = row.pmcid.as_deref().filter(|s| !s.is_empty()) {
                by_pmcid.entry(pmcid.to_string()).or_insert(i);
            }
        }
        Self {
            rows,
            by_sha,
            by_pmcid,
            by_cord_uid,
        }
    }

    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        tracing::info!("Loaded {} CORD-19 metadata rows", rows.len());
        Ok(Self::new(rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metadata of a parsed document: PDF parses are keyed by SHA, PMC
    /// parses by PMC id
    pub fn lookup(&self, source: Source, paper_id: &str) -> Option<&CordMetadata> {
        let index = match source {
            Source::CordPdf => self.by_sha.get(paper_id),
            Source::CordPmc => self.by_pmcid.get(paper_id),
            Source::PubMed => None,
        };
        index.map(|&i| &self.rows[i])
    }

    pub fn by_cord_uid(&self, cord_uid: &str) -> Option<&CordMetadata> {
        self.by_cord_uid.get(cord_uid).map(|&i| &self.rows[i])
    }
}

/// File name of a document parse
fn file_stem(source: Source, name: &str) -> Option<&str> {
    match source {
        Source::CordPdf => name.strip_suffix(".json"),
        Source::CordPmc => name.strip_suffix(".xml.json"),
        Source::PubMed => None,
    }
}

impl SearchRecord {
    /// Scan a CORD-19 document. The id is the PubMed ID when the metadata
    /// has one, otherwise the CORD-19 uid, otherwise the paper id.
    pub fn from_cord(document: &CordDocument, metadata: Option<&CordMetadata>) -> Self {
        let pm_id = metadata
            .and_then(|m| m.pubmed_id.clone())
            .filter(|s| !s.is_empty());
        let cord_id = metadata.map(|m| m.cord_uid.clone());
        let id = pm_id
            .clone()
            .or_else(|| cord_id.clone())
            .unwrap_or_else(|| document.paper_id.clone());

        let mut record = SearchRecord::with_hits(id, document.source, document.scan());
        record.doi = metadata.and_then(|m| m.doi.clone()).filter(|s| !s.is_empty());
        record.pm_id = pm_id;
        record.cord_id = cord_id;
        record
    }
}

/// Scan every document parse in `dir` published on or after `since`.
///
/// Documents without metadata, or without a publication date, are skipped.
pub fn scan_directory(
    dir: &Path,
    source: Source,
    index: &MetadataIndex,
    since: NaiveDate,
) -> Result<Vec<SearchRecord>> {
    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();

    let mut records = Vec::new();
    for name in &names {
        let Some(stem) = file_stem(source, name) else {
            continue;
        };
        let Some(meta) = index.lookup(source, stem) else {
            continue;
        };
        if !meta.published().is_some_and(|d| d >= since) {
            continue;
        }
        let document = CordDocument::load(&dir.join(name), source)?;
        records.push(SearchRecord::from_cord(&document, Some(meta)));
    }

    tracing::info!(
        "Scanned {} {} documents in {}",
        records.len(),
        source,
        dir.display()
    );
    Ok(records)
}
