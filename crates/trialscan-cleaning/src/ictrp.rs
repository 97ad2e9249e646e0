//! ICTRP export cleaning
//!
//! Reads the WHO ICTRP COVID-19 CSV export, normalizes every field used in
//! the analysis and writes one [`TrialRecord`] per trial.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::{
    apply_known_errors, clean_intervention, cross_registered_retrospective, duplicate_ids,
    earliest_cross_registration, enroll_extract, enrollment_dates, extract_target_enrollment,
    is_retrospective, normalize_countries, normalize_name, normalize_phase,
    normalize_recruitment_status, normalize_sponsor_placeholder, normalize_study_type,
    parse_registration_date, CleaningError, CrossRegistration, InterventionAssessment,
    InterventionTable, LookupTable, RawValue, Reconciliation, Result, TargetEnrollment,
    UnsupportedValue, KNOWN_ENROLLMENT_ERRORS, NOT_AVAILABLE,
};

/// Registration cutoff used by the inclusion criteria
pub fn default_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

/// One row of the raw export. Unused columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IctrpRow {
    #[serde(rename = "TrialID")]
    pub trial_id: String,
    #[serde(rename = "Source Register", default)]
    pub source_register: Option<String>,
    #[serde(rename = "Date registration3", default)]
    pub date_registration: Option<String>,
    #[serde(rename = "Date enrollement", default)]
    pub date_enrollment: Option<String>,
    #[serde(rename = "Primary sponsor", default)]
    pub primary_sponsor: Option<String>,
    #[serde(rename = "Recruitment Status", default)]
    pub recruitment_status: Option<String>,
    #[serde(rename = "Phase", default)]
    pub phase: Option<String>,
    #[serde(rename = "Study type", default)]
    pub study_type: Option<String>,
    #[serde(rename = "Countries", default)]
    pub countries: Option<String>,
    #[serde(rename = "Public title", default)]
    pub public_title: Option<String>,
    #[serde(rename = "Intervention", default)]
    pub intervention: Option<String>,
    #[serde(rename = "Target size", default)]
    pub target_size: Option<String>,
    #[serde(rename = "web address", default)]
    pub web_address: Option<String>,
}

/// A cleaned trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub trialid: String,
    pub source_register: String,
    pub date_registration: Option<NaiveDate>,
    pub date_enrollement: Option<NaiveDate>,
    pub retrospective_registration: bool,
    /// Sponsor after ASCII folding, used as the lookup key
    pub primary_sponsor: String,
    /// Curated sponsor name, filled from the sponsor lookup table
    pub normed_spon_names: Option<String>,
    pub recruitment_status: String,
    pub phase: String,
    pub study_type: String,
    pub countries: String,
    pub public_title: String,
    /// Curated intervention category, filled from the intervention table
    pub study_category: Option<String>,
    /// Registry intervention text until the curated one is joined
    pub intervention: String,
    pub intervention_list: Option<String>,
    pub target_enrollment: TargetEnrollment,
    pub web_address: String,
    pub cross_registrations: String,
}

/// Read the raw export
pub fn read_ictrp(path: &Path) -> Result<Vec<IctrpRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    tracing::info!("The ICTRP shows {} trials", rows.len());
    Ok(rows)
}

/// Clean raw rows into trial records.
///
/// Fails if any target size cannot be interpreted.
pub fn clean_rows(mut rows: Vec<IctrpRow>) -> Result<Vec<TrialRecord>> {
    let mismatched = apply_known_errors(
        rows.iter_mut()
            .map(|r| (r.trial_id.as_str(), &mut r.date_enrollment)),
        KNOWN_ENROLLMENT_ERRORS,
    );
    if !mismatched.is_empty() {
        tracing::warn!("{} known corrections were not applied", mismatched.len());
    }

    let sizes: Vec<RawValue> = rows
        .iter()
        .map(|r| r.target_size.as_deref().map_or(RawValue::Missing, RawValue::from_cell))
        .collect();
    let enrollments = enroll_extract(&sizes)?;

    let records = rows
        .into_iter()
        .zip(enrollments)
        .map(|(row, target_enrollment)| clean_row(row, target_enrollment))
        .collect::<Vec<_>>();

    let duplicates = duplicate_ids(records.iter().map(|r| r.trialid.as_str()));
    if !duplicates.is_empty() {
        tracing::warn!("Duplicate trial ids: {:?}", duplicates);
    }

    Ok(records)
}

fn clean_row(row: IctrpRow, target_enrollment: TargetEnrollment) -> TrialRecord {
    let date_registration = row
        .date_registration
        .as_deref()
        .and_then(parse_registration_date);
    normalize_row(row, date_registration, target_enrollment)
}

fn normalize_row(
    row: IctrpRow,
    date_registration: Option<NaiveDate>,
    target_enrollment: TargetEnrollment,
) -> TrialRecord {
    let date_enrollement = row.date_enrollment.as_deref().and_then(enrollment_dates);
    let study_type = normalize_study_type(row.study_type.as_deref().unwrap_or_default());
    let sponsor = normalize_name(row.primary_sponsor.as_deref().unwrap_or_default());

    TrialRecord {
        trialid: row.trial_id,
        source_register: row.source_register.unwrap_or_default(),
        date_registration,
        date_enrollement,
        retrospective_registration: is_retrospective(date_registration, date_enrollement),
        primary_sponsor: normalize_sponsor_placeholder(&sponsor),
        normed_spon_names: None,
        recruitment_status: normalize_recruitment_status(row.recruitment_status.as_deref()),
        phase: normalize_phase(row.phase.as_deref(), &study_type),
        study_type,
        countries: normalize_countries(row.countries.as_deref()),
        public_title: row.public_title.unwrap_or_default(),
        study_category: None,
        intervention: clean_intervention(row.intervention.as_deref().unwrap_or_default()),
        intervention_list: None,
        target_enrollment,
        web_address: row.web_address.unwrap_or_default(),
        cross_registrations: "None".to_string(),
    }
}

/// One row of the additional-trials sheet: preferred registry entries of
/// cross-registered trials that the export does not carry. Dates are
/// already ISO formatted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdditionalTrialRow {
    #[serde(rename = "TrialID")]
    pub trial_id: String,
    #[serde(rename = "Source_Register", default)]
    pub source_register: Option<String>,
    #[serde(rename = "Date_registration", default)]
    pub date_registration: Option<String>,
    #[serde(rename = "Date_enrollement", default)]
    pub date_enrollment: Option<String>,
    #[serde(rename = "Primary_sponsor", default)]
    pub primary_sponsor: Option<String>,
    #[serde(rename = "Recruitment_Status", default)]
    pub recruitment_status: Option<String>,
    #[serde(rename = "Phase", default)]
    pub phase: Option<String>,
    #[serde(rename = "Study_type", default)]
    pub study_type: Option<String>,
    #[serde(rename = "Countries", default)]
    pub countries: Option<String>,
    #[serde(rename = "Public_title", default)]
    pub public_title: Option<String>,
    #[serde(rename = "Intervention", default)]
    pub intervention: Option<String>,
    #[serde(default)]
    pub target_enrollment: Option<String>,
    #[serde(default)]
    pub web_address: Option<String>,
}

impl AdditionalTrialRow {
    fn into_record(self, index: usize) -> Result<TrialRecord> {
        let size = self
            .target_enrollment
            .as_deref()
            .map_or(RawValue::Missing, RawValue::from_cell);
        let target_enrollment = match &size {
            RawValue::Text(s) if s.trim() == NOT_AVAILABLE => TargetEnrollment::NotAvailable,
            _ => extract_target_enrollment(&size).map_err(|UnsupportedValue(v)| {
                CleaningError::UnsupportedValue {
                    index,
                    value: v.to_string(),
                }
            })?,
        };
        let date_registration = self.date_registration.as_deref().and_then(enrollment_dates);
        let row = IctrpRow {
            trial_id: self.trial_id,
            source_register: self.source_register,
            date_registration: None,
            date_enrollment: self.date_enrollment,
            primary_sponsor: self.primary_sponsor,
            recruitment_status: self.recruitment_status,
            phase: self.phase,
            study_type: self.study_type,
            countries: self.countries,
            public_title: self.public_title,
            intervention: self.intervention,
            target_size: None,
            web_address: self.web_address,
        };
        Ok(normalize_row(row, date_registration, target_enrollment))
    }
}

/// Read the additional-trials sheet exported as CSV
pub fn read_additional_trials(path: &Path) -> Result<Vec<TrialRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<AdditionalTrialRow>().enumerate() {
        records.push(row?.into_record(index)?);
    }
    tracing::info!(
        "An additional {} known preferred cross registrations were read",
        records.len()
    );
    Ok(records)
}

/// Fold known cross-registrations into the records.
///
/// Entries listed as `id_to_replace` are dropped and `additions` are
/// appended. Each kept entry's retrospective flag is then recomputed from
/// its earliest registration, and the other IDs are recorded in
/// `cross_registrations`.
pub fn apply_cross_registrations(
    records: Vec<TrialRecord>,
    additions: Vec<TrialRecord>,
    cross_registrations: &[CrossRegistration],
) -> Vec<TrialRecord> {
    let replaced: HashSet<&str> = cross_registrations
        .iter()
        .map(|cr| cr.id_to_replace.as_str())
        .collect();
    let earliest = earliest_cross_registration(cross_registrations);

    let mut additional: BTreeMap<&str, &str> = BTreeMap::new();
    for cr in cross_registrations {
        if let Some(ids) = cr.additional_ids.as_deref() {
            additional.entry(cr.trial_id_keep.as_str()).or_insert(ids);
        }
    }

    let before = records.len();
    let mut kept: Vec<TrialRecord> = records
        .into_iter()
        .filter(|r| !replaced.contains(r.trialid.as_str()))
        .collect();
    tracing::info!(
        "{} known cross registrations were removed",
        before - kept.len()
    );
    tracing::info!(
        "An additional {} known preferred cross registrations were added",
        additions.len()
    );
    kept.extend(additions);

    for record in &mut kept {
        let id = record.trialid.as_str();
        if let Some(&cross_date) = earliest.get(id) {
            if let Some(flag) = cross_registered_retrospective(
                record.date_registration,
                record.date_enrollement,
                Some(cross_date),
            ) {
                record.retrospective_registration = flag;
            }
        }
        if let Some(ids) = additional.get(id) {
            record.cross_registrations = ids.to_string();
        }
    }

    kept
}

/// Read the cross-registration sheet exported as CSV
pub fn read_cross_registrations(path: &Path) -> Result<Vec<CrossRegistration>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Fill `normed_spon_names` from the sponsor table
pub fn apply_sponsor_lookup(records: &mut [TrialRecord], table: &LookupTable) -> Reconciliation {
    let result = table.reconcile(records.iter().map(|r| r.primary_sponsor.as_str()));
    for (record, name) in records.iter_mut().zip(&result.resolved) {
        record.normed_spon_names = name.clone();
    }
    if result.is_converged() {
        tracing::info!("All sponsor names normalized");
    } else {
        tracing::warn!(
            "{} sponsor names need normalizing",
            result.unresolved.len()
        );
    }
    result
}

/// Fill the curated intervention columns, keyed by trial id.
///
/// The curated intervention replaces the registry text where present.
pub fn apply_intervention_lookup(
    records: &mut [TrialRecord],
    table: &InterventionTable,
) -> Reconciliation<InterventionAssessment> {
    let result = table.reconcile(records.iter().map(|r| r.trialid.as_str()));
    for (record, assessment) in records.iter_mut().zip(&result.resolved) {
        let Some(assessment) = assessment else {
            continue;
        };
        record.study_category = assessment.study_category.clone();
        if let Some(intervention) = &assessment.intervention {
            record.intervention = intervention.clone();
        }
        record.intervention_list = assessment.intervention_list.clone();
    }
    if result.is_converged() {
        tracing::info!("All intervention types matched");
    } else {
        tracing::warn!("{} trials need an intervention type", result.unresolved.len());
    }
    result
}

/// Interventional or prevention study, registered on or after `cutoff`,
/// and not cancelled or retracted
pub fn is_included(record: &TrialRecord, cutoff: NaiveDate) -> bool {
    let study_type_ok = record.study_type == "Interventional" || record.study_type == "Prevention";
    let registered = record.date_registration.is_some_and(|d| d >= cutoff);
    let withdrawn = record.public_title.contains("Cancelled")
        || record.public_title.contains("Retracted due to");
    study_type_ok && registered && !withdrawn
}

/// Write cleaned records
pub fn write_trials(path: &Path, records: &[TrialRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    tracing::info!("Wrote {} trials to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw_row(id: &str) -> IctrpRow {
        IctrpRow {
            trial_id: id.to_string(),
            source_register: Some("ClinicalTrials.gov".to_string()),
            date_registration: Some("20200310".to_string()),
            date_enrollment: Some("2020-03-01".to_string()),
            primary_sponsor: Some("Hôpital Bichat".to_string()),
            recruitment_status: Some("Not recruiting".to_string()),
            phase: Some("Phase II/III".to_string()),
            study_type: Some("Interventional study".to_string()),
            countries: Some("France;USA;France".to_string()),
            public_title: Some("Hydroxychloroquine for COVID-19".to_string()),
            intervention: Some("Drug: HCQ;Drug: Placebo".to_string()),
            target_size: Some("100".to_string()),
            web_address: Some("https://clinicaltrials.gov/show/NCT04000001".to_string()),
        }
    }

    #[test]
    fn test_clean_row_fields() {
        let records = clean_rows(vec![raw_row("NCT04000001")]).unwrap();
        let r = &records[0];
        assert_eq!(r.date_registration, Some(date(2020, 3, 10)));
        assert_eq!(r.date_enrollement, Some(date(2020, 3, 1)));
        assert!(r.retrospective_registration);
        assert_eq!(r.primary_sponsor, "Hopital Bichat");
        assert_eq!(r.recruitment_status, "Not Recruiting");
        assert_eq!(r.phase, "Phase 2/Phase 3");
        assert_eq!(r.study_type, "Interventional");
        assert_eq!(r.countries, "France, United States");
        assert_eq!(r.intervention, "Drug: HCQDrug: Placebo");
        assert_eq!(r.target_enrollment, TargetEnrollment::Count(100));
        assert_eq!(r.cross_registrations, "None");
    }

    #[test]
    fn test_unsupported_target_size_fails() {
        let mut row = raw_row("NCT04000001");
        row.target_size = Some("about a hundred".to_string());
        assert!(clean_rows(vec![row]).is_err());
    }

    #[test]
    fn test_cross_registration_override() {
        let records = clean_rows(vec![raw_row("NCT04000001"), raw_row("ChiCTR2000000001")]).unwrap();
        let cross = vec![CrossRegistration {
            id_to_replace: "ChiCTR2000000001".to_string(),
            trial_id_keep: "NCT04000001".to_string(),
            cross_reg_date: Some(date(2020, 2, 15)),
            additional_ids: Some("ChiCTR2000000001".to_string()),
        }];

        let merged = apply_cross_registrations(records, Vec::new(), &cross);
        assert_eq!(merged.len(), 1);
        assert!(!merged[0].retrospective_registration);
        assert_eq!(merged[0].cross_registrations, "ChiCTR2000000001");
    }

    #[test]
    fn test_preferred_entry_added_back() {
        let records = clean_rows(vec![raw_row("ChiCTR2000000001")]).unwrap();
        let addition = AdditionalTrialRow {
            trial_id: "NCT04999999".to_string(),
            source_register: Some("ClinicalTrials.gov".to_string()),
            date_registration: Some("2020-03-10".to_string()),
            date_enrollment: Some("2020-03-01".to_string()),
            study_type: Some("Interventional".to_string()),
            target_enrollment: Some("60".to_string()),
            ..Default::default()
        }
        .into_record(0)
        .unwrap();
        let cross = vec![CrossRegistration {
            id_to_replace: "ChiCTR2000000001".to_string(),
            trial_id_keep: "NCT04999999".to_string(),
            cross_reg_date: Some(date(2020, 2, 20)),
            additional_ids: Some("ChiCTR2000000001".to_string()),
        }];

        let merged = apply_cross_registrations(records, vec![addition], &cross);
        assert_eq!(merged.len(), 1);
        let kept = &merged[0];
        assert_eq!(kept.trialid, "NCT04999999");
        assert_eq!(kept.date_registration, Some(date(2020, 3, 10)));
        assert_eq!(kept.target_enrollment, TargetEnrollment::Count(60));
        assert!(!kept.retrospective_registration);
        assert_eq!(kept.cross_registrations, "ChiCTR2000000001");
    }

    #[test]
    fn test_addition_keeps_not_available_enrollment() {
        let addition = AdditionalTrialRow {
            trial_id: "NCT04999999".to_string(),
            target_enrollment: Some("Not Available".to_string()),
            ..Default::default()
        };
        let record = addition.into_record(0).unwrap();
        assert_eq!(record.target_enrollment, TargetEnrollment::NotAvailable);
    }

    #[test]
    fn test_intervention_lookup_replaces_registry_text() {
        let mut records = clean_rows(vec![raw_row("NCT04000001"), raw_row("NCT04000002")]).unwrap();
        let table = InterventionTable::from_entries([
            (
                "NCT04000001",
                InterventionAssessment {
                    study_category: Some("Drug".to_string()),
                    intervention: Some("Hydroxychloroquine".to_string()),
                    intervention_list: Some("Hydroxychloroquine".to_string()),
                },
            ),
            (
                "NCT04000002",
                InterventionAssessment {
                    study_category: Some("Drug".to_string()),
                    ..Default::default()
                },
            ),
        ]);

        let result = apply_intervention_lookup(&mut records, &table);
        assert_eq!(result.unresolved.keys().collect::<Vec<_>>(), vec!["NCT04000002"]);
        assert_eq!(records[0].intervention, "Hydroxychloroquine");
        assert_eq!(records[0].intervention_list.as_deref(), Some("Hydroxychloroquine"));
        assert_eq!(records[1].study_category.as_deref(), Some("Drug"));
        assert_eq!(records[1].intervention, "Drug: HCQDrug: Placebo");
    }

    #[test]
    fn test_sponsor_lookup() {
        let mut records = clean_rows(vec![raw_row("NCT04000001")]).unwrap();
        let table = LookupTable::from_pairs([("Hopital Bichat", "Assistance Publique - Hôpitaux de Paris")]);
        let result = apply_sponsor_lookup(&mut records, &table);
        assert!(result.is_converged());
        assert_eq!(
            records[0].normed_spon_names.as_deref(),
            Some("Assistance Publique - Hôpitaux de Paris")
        );
    }

    #[test]
    fn test_inclusion() {
        let mut record = clean_rows(vec![raw_row("NCT04000001")]).unwrap().remove(0);
        assert!(is_included(&record, default_cutoff()));

        record.public_title = "Cancelled by sponsor".to_string();
        assert!(!is_included(&record, default_cutoff()));

        record.public_title = "Trial".to_string();
        record.date_registration = Some(date(2019, 12, 31));
        assert!(!is_included(&record, default_cutoff()));

        record.date_registration = Some(date(2020, 1, 1));
        record.study_type = "Observational".to_string();
        assert!(!is_included(&record, default_cutoff()));
    }
}
