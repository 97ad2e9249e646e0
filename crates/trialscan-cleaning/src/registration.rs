//! Registration bookkeeping: known data errors, duplicate IDs,
//! retrospective registration and cross-registrations

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A hand-checked correction to a raw enrollment date.
///
/// Applied only when the current value still equals `expected`, so a
/// refreshed export that fixed the value upstream is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownCorrection {
    pub trial_id: &'static str,
    /// `None` matches a missing value
    pub expected: Option<&'static str>,
    pub replacement: &'static str,
}

/// Enrollment dates known to be wrong in the 29 June 2020 ICTRP export
pub const KNOWN_ENROLLMENT_ERRORS: &[KnownCorrection] = &[
    KnownCorrection {
        trial_id: "IRCT20200310046736N1",
        expected: Some("2641-06-14"),
        replacement: "2020-04-01",
    },
    KnownCorrection {
        trial_id: "EUCTR2020-001909-22-FR",
        expected: None,
        replacement: "2020-04-29",
    },
];

/// Apply corrections to `(trial id, raw date)` pairs.
///
/// Returns the IDs whose current value did not match the expected original.
pub fn apply_known_errors<'a, I>(rows: I, corrections: &[KnownCorrection]) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a mut Option<String>)>,
{
    let by_id: HashMap<&str, &KnownCorrection> =
        corrections.iter().map(|c| (c.trial_id, c)).collect();
    let mut mismatched = Vec::new();

    for (trial_id, value) in rows {
        let Some(correction) = by_id.get(trial_id) else {
            continue;
        };
        let current = value.as_deref().filter(|v| !v.is_empty());
        if current == correction.expected {
            *value = Some(correction.replacement.to_string());
        } else {
            tracing::warn!("Original value did not match for {}", trial_id);
            mismatched.push(trial_id.to_string());
        }
    }

    mismatched
}

/// Trial IDs that occur more than once, in first-repeat order
pub fn duplicate_ids<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for id in ids {
        if !seen.insert(id) && !duplicates.iter().any(|d: &String| d == id) {
            duplicates.push(id.to_string());
        }
    }
    duplicates
}

/// Registered after enrollment began. Unknown when either date is missing,
/// which counts as not retrospective.
pub fn is_retrospective(registration: Option<NaiveDate>, enrollment: Option<NaiveDate>) -> bool {
    match (registration, enrollment) {
        (Some(reg), Some(enr)) => reg > enr,
        _ => false,
    }
}

/// One row of the manual cross-registration sheet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrossRegistration {
    /// Registry entry dropped in favour of `trial_id_keep`
    pub id_to_replace: String,
    pub trial_id_keep: String,
    /// Registration date of the dropped entry
    #[serde(default)]
    pub cross_reg_date: Option<NaiveDate>,
    /// Other IDs of the same trial, as displayed
    #[serde(default)]
    pub additional_ids: Option<String>,
}

/// Earliest known registration date of each kept trial across its
/// cross-registrations
pub fn earliest_cross_registration(
    cross_registrations: &[CrossRegistration],
) -> BTreeMap<String, NaiveDate> {
    let mut earliest: BTreeMap<String, NaiveDate> = BTreeMap::new();
    for cr in cross_registrations {
        if let Some(date) = cr.cross_reg_date {
            earliest
                .entry(cr.trial_id_keep.clone())
                .and_modify(|d| *d = (*d).min(date))
                .or_insert(date);
        }
    }
    earliest
}

/// Retrospective flag taking cross-registrations into account.
///
/// The trial counts as prospectively registered when any of its
/// registrations predates (or equals) the enrollment date. Returns `None`
/// when the comparison cannot be made and the original flag should stand.
pub fn cross_registered_retrospective(
    registration: Option<NaiveDate>,
    enrollment: Option<NaiveDate>,
    earliest_cross: Option<NaiveDate>,
) -> Option<bool> {
    let earliest = match (registration, earliest_cross) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    let enrollment = enrollment?;
    Some(earliest > enrollment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_errors_applied() {
        let mut rows = vec![
            ("IRCT20200310046736N1".to_string(), Some("2641-06-14".to_string())),
            ("EUCTR2020-001909-22-FR".to_string(), None),
            ("NCT04280705".to_string(), Some("2020-02-01".to_string())),
        ];
        let mismatched = apply_known_errors(
            rows.iter_mut().map(|(id, v)| (id.as_str(), v)),
            KNOWN_ENROLLMENT_ERRORS,
        );
        assert!(mismatched.is_empty());
        assert_eq!(rows[0].1.as_deref(), Some("2020-04-01"));
        assert_eq!(rows[1].1.as_deref(), Some("2020-04-29"));
        assert_eq!(rows[2].1.as_deref(), Some("2020-02-01"));
    }

    #[test]
    fn test_known_error_mismatch_reported() {
        let mut rows = vec![("IRCT20200310046736N1".to_string(), Some("2020-03-20".to_string()))];
        let mismatched = apply_known_errors(
            rows.iter_mut().map(|(id, v)| (id.as_str(), v)),
            KNOWN_ENROLLMENT_ERRORS,
        );
        assert_eq!(mismatched, vec!["IRCT20200310046736N1"]);
        assert_eq!(rows[0].1.as_deref(), Some("2020-03-20"));
    }

    #[test]
    fn test_duplicate_ids() {
        let ids = ["A", "B", "A", "C", "A", "B"];
        assert_eq!(duplicate_ids(ids), vec!["A", "B"]);
    }

    #[test]
    fn test_retrospective() {
        assert!(is_retrospective(Some(date(2020, 3, 2)), Some(date(2020, 3, 1))));
        assert!(!is_retrospective(Some(date(2020, 3, 1)), Some(date(2020, 3, 1))));
        assert!(!is_retrospective(Some(date(2020, 3, 1)), None));
    }

    #[test]
    fn test_cross_registration_earliest() {
        let rows = vec![
            CrossRegistration {
                id_to_replace: "ChiCTR2000029308".into(),
                trial_id_keep: "NCT04252274".into(),
                cross_reg_date: Some(date(2020, 2, 2)),
                additional_ids: None,
            },
            CrossRegistration {
                id_to_replace: "EUCTR2020-000001-01".into(),
                trial_id_keep: "NCT04252274".into(),
                cross_reg_date: Some(date(2020, 1, 28)),
                additional_ids: None,
            },
        ];
        let earliest = earliest_cross_registration(&rows);
        assert_eq!(earliest.get("NCT04252274"), Some(&date(2020, 1, 28)));
    }

    #[test]
    fn test_cross_registered_retrospective() {
        // Own registration is late, but a cross-registration predates enrollment.
        assert_eq!(
            cross_registered_retrospective(
                Some(date(2020, 3, 10)),
                Some(date(2020, 3, 1)),
                Some(date(2020, 2, 20)),
            ),
            Some(false)
        );
        assert_eq!(
            cross_registered_retrospective(
                Some(date(2020, 3, 10)),
                Some(date(2020, 3, 1)),
                Some(date(2020, 3, 5)),
            ),
            Some(true)
        );
        assert_eq!(
            cross_registered_retrospective(Some(date(2020, 3, 10)), None, None),
            None
        );
    }
}
