//! Candidate filtering and per-publication aggregation

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::record::{json_list, write_rows};
use crate::{MetadataIndex, Result, SearchRecord};

pub const TRIAL_PUB_TYPE: &str = "Has Trial Pub Type";

/// All scans of one publication merged together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedRecord {
    pub id: String,
    #[serde(with = "json_list")]
    pub id_hits: Option<Vec<String>>,
    #[serde(with = "json_list")]
    pub prefix_hits: Option<Vec<String>>,
    #[serde(with = "json_list")]
    pub reg_name_hits: Option<Vec<String>>,
    #[serde(with = "json_list")]
    pub accession: Option<Vec<String>>,
    /// `Has Trial Pub Type` or empty
    pub pub_types: Option<String>,
    /// DOI as a resolver URL
    pub doi: Option<String>,
    pub pm_id: Option<String>,
    pub cord_id: Option<String>,
    /// From the CORD-19 metadata of `cord_id`
    pub url: Option<String>,
    pub title: Option<String>,
}

/// Whether a record may report a registered trial
pub fn is_candidate(record: &SearchRecord) -> bool {
    record.id_hits.is_some()
        || record.prefix_hits.is_some()
        || record.reg_name_hits.is_some()
        || record.accession.as_ref().is_some_and(|a| !a.is_empty())
        || record
            .pub_types
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains("trial"))
}

pub fn make_doi_url(doi: &str) -> String {
    format!("http://doi.org/{}", doi)
}

/// Flag publication-type strings that name a trial
pub fn trial_pub_type(pub_types: Option<&str>) -> Option<String> {
    pub_types
        .filter(|p| p.contains("Trial") || p.contains("trial"))
        .map(|_| TRIAL_PUB_TYPE.to_string())
}

/// Append `items` to `acc`, skipping values already present
fn union_into(acc: &mut Vec<String>, items: Option<&Vec<String>>) {
    for item in items.into_iter().flatten() {
        if !acc.contains(item) {
            acc.push(item.clone());
        }
    }
}

fn first_present<'a, F>(records: &[&'a SearchRecord], field: F) -> Option<String>
where
    F: Fn(&'a SearchRecord) -> &'a Option<String>,
{
    records
        .iter()
        .find_map(|r| field(*r).as_deref().filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// Group records by id and merge each group.
///
/// List columns are unioned without duplicates in first-seen order; an
/// empty union is `None`. Scalars take the first non-empty value. Output is
/// sorted by id.
pub fn combine_by_id(records: &[SearchRecord]) -> Vec<CombinedRecord> {
    let mut groups: BTreeMap<&str, Vec<&SearchRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.id.as_str()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(id, group)| {
            let mut id_hits = Vec::new();
            let mut prefix_hits = Vec::new();
            let mut reg_name_hits = Vec::new();
            let mut accession = Vec::new();
            for r in &group {
                union_into(&mut id_hits, r.id_hits.as_ref());
                union_into(&mut prefix_hits, r.prefix_hits.as_ref());
                union_into(&mut reg_name_hits, r.reg_name_hits.as_ref());
                union_into(&mut accession, r.accession.as_ref());
            }
            let non_empty = |v: Vec<String>| Some(v).filter(|v| !v.is_empty());

            let pub_types = first_present(&group, |r| &r.pub_types);
            CombinedRecord {
                id: id.to_string(),
                id_hits: non_empty(id_hits),
                prefix_hits: non_empty(prefix_hits),
                reg_name_hits: non_empty(reg_name_hits),
                accession: non_empty(accession),
                pub_types: trial_pub_type(pub_types.as_deref()),
                doi: first_present(&group, |r| &r.doi).map(|d| make_doi_url(&d)),
                pm_id: first_present(&group, |r| &r.pm_id),
                cord_id: first_present(&group, |r| &r.cord_id),
                url: None,
                title: None,
            }
        })
        .collect()
}

/// Fill `url` and `title` from the CORD-19 metadata
pub fn attach_metadata(records: &mut [CombinedRecord], index: &MetadataIndex) {
    for record in records {
        let Some(meta) = record.cord_id.as_deref().and_then(|uid| index.by_cord_uid(uid)) else {
            continue;
        };
        record.url = meta.url.clone().filter(|s| !s.is_empty());
        record.title = meta.title.clone().filter(|s| !s.is_empty());
    }
}

/// Filter candidates, combine them by id and attach CORD-19 metadata when
/// an index is given
pub fn screen(records: &[SearchRecord], metadata: Option<&MetadataIndex>) -> Vec<CombinedRecord> {
    let candidates: Vec<SearchRecord> = records.iter().filter(|r| is_candidate(r)).cloned().collect();
    tracing::info!(
        "{} of {} records are candidates",
        candidates.len(),
        records.len()
    );
    let mut combined = combine_by_id(&candidates);
    if let Some(index) = metadata {
        attach_metadata(&mut combined, index);
    }
    combined
}

pub fn write_combined(path: &Path, records: &[CombinedRecord]) -> Result<()> {
    write_rows(path, records)
}
