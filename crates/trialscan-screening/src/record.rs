//! Screening table rows and their CSV form
//!
//! List columns are stored as JSON arrays so a row survives a round trip
//! through a spreadsheet.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use trialscan_identifiers::DocumentHits;

use crate::Result;

/// Where a document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "PubMed")]
    PubMed,
    #[serde(rename = "cord_pdf")]
    CordPdf,
    #[serde(rename = "cord_pmc")]
    CordPmc,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PubMed => "PubMed",
            Source::CordPdf => "cord_pdf",
            Source::CordPmc => "cord_pmc",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scanned document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// PubMed ID when known, otherwise the CORD-19 uid
    pub id: String,
    pub source: Source,
    #[serde(with = "json_list", default)]
    pub id_hits: Option<Vec<String>>,
    #[serde(with = "json_list", default)]
    pub prefix_hits: Option<Vec<String>>,
    #[serde(with = "json_list", default)]
    pub reg_name_hits: Option<Vec<String>>,
    /// Databank accession numbers listed by PubMed
    #[serde(with = "json_list", default)]
    pub accession: Option<Vec<String>>,
    #[serde(default)]
    pub pub_types: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub pm_id: Option<String>,
    #[serde(default)]
    pub cord_id: Option<String>,
}

impl SearchRecord {
    /// A record carrying the scan result of one document
    pub fn with_hits(id: impl Into<String>, source: Source, hits: DocumentHits) -> Self {
        Self {
            id: id.into(),
            source,
            id_hits: hits.id_hits,
            prefix_hits: hits.prefix_hits,
            reg_name_hits: hits.reg_name_hits,
            accession: None,
            pub_types: None,
            doi: None,
            pm_id: None,
            cord_id: None,
        }
    }

    pub fn hits(&self) -> DocumentHits {
        DocumentHits {
            id_hits: self.id_hits.clone(),
            prefix_hits: self.prefix_hits.clone(),
            reg_name_hits: self.reg_name_hits.clone(),
        }
    }
}

/// Read a screening table
pub fn read_search_records(path: &Path) -> Result<Vec<SearchRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Write a screening table
pub fn write_search_records(path: &Path, records: &[SearchRecord]) -> Result<()> {
    write_rows(path, records)
}

pub(crate) fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// `Option<Vec<String>>` as a JSON array cell. Empty cells and empty
/// arrays read as `None`.
pub(crate) mod json_list {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(items) => {
                let json = serde_json::to_string(items).map_err(ser::Error::custom)?;
                serializer.serialize_str(&json)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        let cell: Option<String> = Option::deserialize(deserializer)?;
        match cell.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => {
                let items: Vec<String> = serde_json::from_str(text).map_err(de::Error::custom)?;
                Ok(Some(items).filter(|v| !v.is_empty()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_source_labels() {
        assert_eq!(Source::PubMed.to_string(), "PubMed");
        assert_eq!(Source::CordPmc.as_str(), "cord_pmc");
    }

    #[test]
    fn test_csv_round_trip_keeps_lists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search.csv");

        let mut record = SearchRecord::with_hits(
            "32109013",
            Source::PubMed,
            DocumentHits {
                id_hits: Some(vec!["NCT04280705".into(), "ChiCTR2000029308".into()]),
                prefix_hits: Some(vec!["NCT".into()]),
                reg_name_hits: None,
            },
        );
        record.pub_types = Some("['Journal Article']".into());
        record.pm_id = Some("32109013".into());

        write_search_records(&path, &[record.clone()]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#""[""NCT04280705"",""ChiCTR2000029308""]""#));

        let back = read_search_records(&path).unwrap();
        assert_eq!(back, vec![record]);
    }
}
