//! Vocabulary cleanup for ICTRP fields
//!
//! Registries spell the same study type, phase, status or country many
//! ways. Each function maps the known spellings onto one canonical value
//! and leaves anything unrecognised as it is.

pub const NOT_APPLICABLE: &str = "Not Applicable";
pub const NO_STATUS: &str = "No Status Given";
pub const NO_COUNTRY: &str = "No Country Given";
pub const NO_SPONSOR: &str = "No Sponsor Name Given";

const OBSERVATIONAL: &[&str] = &[
    "Observational [Patient Registry]",
    "observational",
    "Observational Study",
];

const INTERVENTIONAL: &[&str] = &[
    "interventional",
    "Interventional clinical trial of medicinal product",
    "Treatment",
    "INTERVENTIONAL",
    "Intervention",
    "Interventional Study",
    "PMS",
];

const HEALTH_SERVICES: &[&str] = &[
    "Health services reaserch",
    "Health Services reaserch",
    "Health Services Research",
];

/// Canonical study type
pub fn normalize_study_type(raw: &str) -> String {
    let value = raw.replace(" study", "");
    let value = value.as_str();

    if OBSERVATIONAL.contains(&value) {
        "Observational".to_string()
    } else if INTERVENTIONAL.contains(&value) {
        "Interventional".to_string()
    } else if value == "Epidemilogical research" {
        "Epidemiological research".to_string()
    } else if HEALTH_SERVICES.contains(&value) {
        "Health services research".to_string()
    } else if value == "Others,meta-analysis etc" {
        "Other".to_string()
    } else {
        value.to_string()
    }
}

/// EU CTR phase checklist, as exported
fn eu_phases(p1: bool, p2: bool, p3: bool, p4: bool) -> String {
    let yn = |b: bool| if b { "yes" } else { "no" };
    format!(
        "Human pharmacology (Phase I): {}\nTherapeutic exploratory (Phase II): {}\n\
         Therapeutic confirmatory - (Phase III): {}\nTherapeutic use (Phase IV): {}\n",
        yn(p1),
        yn(p2),
        yn(p3),
        yn(p4)
    )
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn phase_table() -> Vec<(&'static str, Vec<String>)> {
    vec![
        (
            NOT_APPLICABLE,
            owned(&[
                "0",
                "Retrospective study",
                "Not applicable",
                "New Treatment Measure Clinical Study",
                "Not selected",
                "Phase 0",
                "Diagnostic New Technique Clincal Study",
                "0 (exploratory trials)",
                "Not Specified",
            ]),
        ),
        (
            "Phase 1",
            owned(&["1", "Early Phase 1", "I", "Phase-1", "Phase I"]),
        ),
        ("Phase 1/Phase 2", {
            let mut v = owned(&[
                "1-2",
                "2020-02-01 00:00:00",
                "Phase I/II",
                "Phase 1 / Phase 2",
                "Phase 1/ Phase 2",
            ]);
            v.push(eu_phases(true, true, false, false));
            v
        }),
        ("Phase 2", {
            let mut v = owned(&["2", "II", "Phase II", "IIb", "Phase-2", "Phase2"]);
            v.push(eu_phases(false, true, false, false));
            v
        }),
        ("Phase 2/Phase 3", {
            let mut v = owned(&[
                "Phase II/III",
                "2020-03-02 00:00:00",
                "II-III",
                "Phase 2 / Phase 3",
                "Phase 2/ Phase 3",
                "2-3",
            ]);
            v.push(eu_phases(false, true, true, false));
            v
        }),
        ("Phase 3", {
            let mut v = owned(&["3", "Phase III", "Phase-3", "III"]);
            v.push(eu_phases(false, false, true, false));
            v
        }),
        ("Phase 3/Phase 4", {
            let mut v = owned(&["Phase 3/ Phase 4", "Phase III/IV"]);
            v.push(eu_phases(false, false, true, true));
            v
        }),
        ("Phase 4", {
            let mut v = owned(&["4", "IV", "Post Marketing Surveillance", "Phase IV", "PMS"]);
            v.push(eu_phases(false, false, false, true));
            v
        }),
    ]
}

/// Canonical phase. Observational studies never carry a phase.
pub fn normalize_phase(raw: Option<&str>, study_type: &str) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return NOT_APPLICABLE.to_string();
    };

    let phase = phase_table()
        .into_iter()
        .find(|(_, spellings)| spellings.iter().any(|s| s == raw))
        .map_or_else(|| raw.to_string(), |(canonical, _)| canonical.to_string());

    if study_type == "Observational" && phase.contains("Phase") {
        NOT_APPLICABLE.to_string()
    } else {
        phase
    }
}

/// Canonical recruitment status
pub fn normalize_recruitment_status(raw: Option<&str>) -> String {
    match raw.filter(|s| !s.is_empty()) {
        None => NO_STATUS.to_string(),
        Some("Not recruiting") => "Not Recruiting".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Sponsor placeholders
pub fn normalize_sponsor_placeholder(name: &str) -> String {
    match name {
        "" | "NA" | "nan" => NO_SPONSOR.to_string(),
        other => other.to_string(),
    }
}

/// Semicolons in intervention text break downstream CSV consumers
pub fn clean_intervention(raw: &str) -> String {
    raw.replace(';', "")
}

/// Canonical spelling of a single country, or of a whole multi-region value
fn canonical_country(name: &str) -> Option<Vec<&'static str>> {
    let single = match name {
        "Chian" | "China?" | "Chinese" | "Wuhan" | "Chinaese" | "china"
        | "Taiwan, Province Of China" | "The People's Republic of China" => "China",
        "Iran (Islamic Republic of)" | "Iran, Islamic Republic of" => "Iran",
        "Viet nam" | "Viet Nam" => "Vietnam",
        "Korea, Republic of" | "Korea, Republic Of" | "KOREA" => "South Korea",
        "USA" | "United States of America" | "U.S." => "United States",
        "The Netherlands" => "Netherlands",
        "England" => "United Kingdom",
        "Czechia" => "Czech Republic",
        "ASIA" => "Asia",
        "EUROPE" => "Europe",
        "MALAYSIA" => "Malaysia",
        "Congo" | "Congo, Democratic Republic" | "Congo, The Democratic Republic of the" => {
            "Democratic Republic of Congo"
        }
        "C√¥te D'Ivoire" | "Cote Divoire" => "Cote d'Ivoire",
        "Japan,Asia(except Japan),Australia,Europe" => {
            return Some(vec!["Japan", "Australia", "Asia", "Europe"])
        }
        "Japan,Asia(except Japan),North America,South America,Australia,Europe,Africa" => {
            return Some(vec![
                "Japan, Asia(except Japan), North America, South America, Australia, Europe, Africa",
            ])
        }
        "Japan,North America" => return Some(vec!["Japan", "North America"]),
        _ => return None,
    };
    Some(vec![single])
}

/// Canonical country list, joined with `", "`.
///
/// `;`-separated lists are deduplicated in first-seen order.
pub fn normalize_countries(raw: Option<&str>) -> String {
    let value = match raw.map(str::trim) {
        None | Some("") | Some("??") => return NO_COUNTRY.to_string(),
        Some(v) => v,
    };

    if let Some(whole) = canonical_country(value) {
        return whole.join(", ");
    }

    let mut countries: Vec<String> = Vec::new();
    for part in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let mapped = canonical_country(part)
            .map(|names| names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .unwrap_or_else(|| vec![part.to_string()]);
        for country in mapped {
            if !countries.contains(&country) {
                countries.push(country);
            }
        }
    }

    if countries.is_empty() {
        NO_COUNTRY.to_string()
    } else {
        countries.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_type() {
        assert_eq!(normalize_study_type("Interventional study"), "Interventional");
        assert_eq!(normalize_study_type("INTERVENTIONAL"), "Interventional");
        assert_eq!(normalize_study_type("Observational Study"), "Observational");
        assert_eq!(normalize_study_type("Health Services Research"), "Health services research");
        assert_eq!(normalize_study_type("Prevention"), "Prevention");
    }

    #[test]
    fn test_phase() {
        assert_eq!(normalize_phase(Some("Phase I/II"), "Interventional"), "Phase 1/Phase 2");
        assert_eq!(normalize_phase(Some("IIb"), "Interventional"), "Phase 2");
        assert_eq!(normalize_phase(None, "Interventional"), NOT_APPLICABLE);
        assert_eq!(normalize_phase(Some("Not selected"), "Interventional"), NOT_APPLICABLE);
        assert_eq!(normalize_phase(Some("Phase-3"), "Observational"), NOT_APPLICABLE);
    }

    #[test]
    fn test_eu_phase_checklist() {
        let raw = "Human pharmacology (Phase I): no\nTherapeutic exploratory (Phase II): yes\n\
                   Therapeutic confirmatory - (Phase III): yes\nTherapeutic use (Phase IV): no\n";
        assert_eq!(normalize_phase(Some(raw), "Interventional"), "Phase 2/Phase 3");
    }

    #[test]
    fn test_recruitment_status() {
        assert_eq!(normalize_recruitment_status(Some("Not recruiting")), "Not Recruiting");
        assert_eq!(normalize_recruitment_status(None), NO_STATUS);
        assert_eq!(normalize_recruitment_status(Some("Recruiting")), "Recruiting");
    }

    #[test]
    fn test_countries() {
        assert_eq!(normalize_countries(Some("Chian")), "China");
        assert_eq!(normalize_countries(Some("USA;Iran, Islamic Republic of;USA")), "United States, Iran");
        assert_eq!(normalize_countries(Some("??")), NO_COUNTRY);
        assert_eq!(normalize_countries(None), NO_COUNTRY);
        assert_eq!(normalize_countries(Some("Japan,North America")), "Japan, North America");
        assert_eq!(normalize_countries(Some(" France ")), "France");
    }

    #[test]
    fn test_sponsor_placeholder_and_intervention() {
        assert_eq!(normalize_sponsor_placeholder("NA"), NO_SPONSOR);
        assert_eq!(normalize_sponsor_placeholder("WHO"), "WHO");
        assert_eq!(clean_intervention("Drug: A;Drug: B"), "Drug: ADrug: B");
    }
}
