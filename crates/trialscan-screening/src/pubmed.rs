//! PubMed archive records
//!
//! The archive is a CSV with one article per row. The `xml_json` column
//! holds the PubMed XML record converted to JSON, where a repeated element
//! is an array and a single one is an object.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use trialscan_identifiers::scan_document;

use crate::{Result, ScreeningError, SearchRecord, Source};

/// One archived PubMed article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubmedArticle {
    pub pmid: String,
    pub doi: Option<String>,
    pub abstract_text: Option<String>,
    /// Databank accession numbers, in listing order
    pub accession: Option<Vec<String>>,
    /// Publication types as a bracketed list, e.g. `['Journal Article']`
    pub pub_types: Option<String>,
}

#[derive(Deserialize)]
struct ArchiveRow {
    xml_json: String,
}

/// Elements of a field that may hold one item or a list
fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Text of an element, either bare or under `#text`
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("#text").and_then(text_of),
        _ => None,
    }
}

impl PubmedArticle {
    /// Parse one `xml_json` record
    pub fn from_xml_json(json: &str) -> Result<Self> {
        let root: Value =
            serde_json::from_str(json).map_err(|e| ScreeningError::InvalidArticle(e.to_string()))?;
        let entry = &root["PubmedArticle"];
        let citation = &entry["MedlineCitation"];
        let article = &citation["Article"];

        let pmid = text_of(&citation["PMID"])
            .ok_or_else(|| ScreeningError::InvalidArticle("missing PMID".to_string()))?;

        let doi = one_or_many(&entry["PubmedData"]["ArticleIdList"]["ArticleId"])
            .into_iter()
            .find(|id| id["@IdType"] == "doi")
            .and_then(text_of);

        let accession: Vec<String> = one_or_many(&article["DataBankList"]["DataBank"])
            .into_iter()
            .flat_map(|bank| one_or_many(&bank["AccessionNumberList"]["AccessionNumber"]))
            .filter_map(text_of)
            .collect();

        // Structured abstracts are scanned in their JSON form
        let abstract_text = match &article["Abstract"]["AbstractText"] {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };

        let pub_types: Vec<String> =
            one_or_many(&article["PublicationTypeList"]["PublicationType"])
                .into_iter()
                .filter_map(text_of)
                .map(|t| format!("'{}'", t))
                .collect();

        Ok(Self {
            pmid,
            doi,
            abstract_text,
            accession: Some(accession).filter(|a| !a.is_empty()),
            pub_types: Some(pub_types)
                .filter(|p| !p.is_empty())
                .map(|p| format!("[{}]", p.join(", "))),
        })
    }
}

/// Read the PubMed archive
pub fn read_pubmed_archive(path: &Path) -> Result<Vec<PubmedArticle>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut articles = Vec::new();
    for row in reader.deserialize::<ArchiveRow>() {
        articles.push(PubmedArticle::from_xml_json(&row?.xml_json)?);
    }
    tracing::info!("Loaded {} PubMed articles", articles.len());
    Ok(articles)
}

impl SearchRecord {
    /// Scan an article's abstract
    pub fn from_pubmed(article: &PubmedArticle) -> Self {
        let hits = scan_document(article.abstract_text.as_deref());
        let mut record = SearchRecord::with_hits(article.pmid.clone(), Source::PubMed, hits);
        record.accession = article.accession.clone().filter(|a| !a.is_empty());
        record.pub_types = article.pub_types.clone();
        record.doi = article.doi.clone();
        record.pm_id = Some(article.pmid.clone());
        record
    }
}
