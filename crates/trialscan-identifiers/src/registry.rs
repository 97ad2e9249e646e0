//! Registry pattern catalogue
//!
//! One row per trial registry. Each row carries the registry's exact-ID
//! shapes, the bare prefixes used to catch malformed or truncated IDs, and
//! the registry's full name as it appears in prose.
//!
//! The patterns are empirically derived and published with the screening
//! results. They are fixtures: edits change which publications are found.

use serde::Serialize;

use crate::PatternKind;

/// A trial registry and the patterns that detect it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Registry {
    /// Short label (usually the ID prefix)
    pub label: &'static str,
    /// Full identifier shapes
    pub exact: &'static [&'static str],
    /// Registry abbreviations followed by a word boundary
    pub prefixes: &'static [&'static str],
    /// Registry name in running text
    pub name: Option<&'static str>,
}

impl Registry {
    /// Patterns of one kind, in catalogue order
    pub fn patterns(&self, kind: PatternKind) -> &[&'static str] {
        match kind {
            PatternKind::Exact => self.exact,
            PatternKind::Prefix => self.prefixes,
            PatternKind::RegistryName => self.name.as_slice(),
        }
    }
}

/// The registry table.
///
/// Row order fixes the order in which hits are reported.
pub const REGISTRIES: &[Registry] = &[
    Registry {
        label: "NCT",
        exact: &[r"(?i)NCT\s*\W*0\d{7}"],
        prefixes: &[r"(?i)\bNCT"],
        name: Some(r"(?i)clinicaltrials.gov"),
    },
    Registry {
        label: "EudraCT",
        exact: &[r"20\d{2}\W*0\d{5}\W*\d{2}"],
        prefixes: &[r"(?i)\bEudraCT", r"(?i)\bEUCTR"],
        name: Some(r"(?i)European Union Clinical Trials Register"),
    },
    Registry {
        label: "PACTR",
        exact: &[r"(?i)PACTR\s*\W*20\d{13}"],
        prefixes: &[r"(?i)\bPACTR"],
        name: Some(r"(?i)Pan African Clinical Trial Registry"),
    },
    Registry {
        label: "ANZCTR",
        exact: &[r"(?i)ACTRN\s*\W*126\d{11}", r"(?i)ANZCTR\s*\W*126\d{11}"],
        prefixes: &[r"(?i)\bACTRN", r"(?i)\bANZCTR"],
        // Case-sensitive in the published list.
        name: Some(r"Australian New Zealand Clinical Trials Registry"),
    },
    Registry {
        label: "NTR",
        exact: &[r"(?i)NTR\s*\W*\d{4}"],
        prefixes: &[r"(?i)\bNTR\d*\b"],
        name: Some(r"(?i)Netherlands Trial Register"),
    },
    Registry {
        label: "KCT",
        exact: &[r"(?i)KCT\s*\W*00\d{5}"],
        prefixes: &[r"(?i)\bKCT"],
        name: Some(r"(?i)Clinical Research Information Service"),
    },
    Registry {
        label: "DRKS",
        exact: &[r"(?i)DRKS\s*\W*000\d{5}"],
        prefixes: &[r"(?i)\bDRKS"],
        name: Some(r"(?i)German Clinical Trials Register"),
    },
    Registry {
        label: "ISRCTN",
        exact: &[r"(?i)ISRCTN\s*\W*\d{8}"],
        prefixes: &[r"(?i)\bISRCTN"],
        name: None,
    },
    Registry {
        label: "ChiCTR",
        exact: &[r"(?i)ChiCTR\s*\W*20000\d{5}"],
        prefixes: &[r"(?i)\bChiCTR"],
        name: Some(r"(?i)Chinese Clinical Trial Registry"),
    },
    Registry {
        label: "IRCT",
        exact: &[r"(?i)IRCT\s*\W*20\d{10,11}N\d{1,3}"],
        prefixes: &[r"(?i)\bIRCT"],
        name: Some(r"(?i)Iranian Registry of Clinical Trials"),
    },
    Registry {
        label: "CTRI",
        exact: &[r"(?i)CTRI\s?\W*\/\s*\W*202\d{1}\s?\W*\/\s*\W*\d{2,3}\s*\W*\/\s*\W*0\d{5}"],
        prefixes: &[r"(?i)\bCTRI"],
        name: Some(r"(?i)Clinical Trials Registry-India"),
    },
    Registry {
        label: "JapicCTI",
        exact: &[r"(?i)Japic\s*CTI\s*\W*\d{6}"],
        prefixes: &[r"(?i)\bJapic\s*CTI"],
        name: Some(r"(?i)JAPIC Clinical Trial Information"),
    },
    Registry {
        label: "jRCT",
        exact: &[r"(?i)jrct\W*\w{1}\W*\d{9}"],
        prefixes: &[r"(?i)\bjRCT"],
        name: Some(r"(?i)Japan Registry of Clinical Trial"),
    },
    Registry {
        label: "UMIN",
        exact: &[r"(?i)UMIN\s*\W*\d{9}"],
        prefixes: &[r"(?i)\bUMIN"],
        name: Some(r"(?i)UMIN Clinical Trials Registry"),
    },
    Registry {
        label: "JMA",
        exact: &[r"(?i)JMA\W*IIA00\d{3}"],
        prefixes: &[],
        name: None,
    },
    Registry {
        label: "RBR",
        exact: &[r"(?i)RBR\s*\W*\d\w{5}"],
        prefixes: &[r"(?i)\bRBR"],
        name: Some(r"(?i)Brazilian Clinical Trial Registry"),
    },
    Registry {
        label: "RPCEC",
        exact: &[r"(?i)RPCEC\s*\W*0{5}\d{3}"],
        prefixes: &[r"(?i)\bRPCEC"],
        name: Some(r"(?i)Cuban Public Registry of Clinical Trials"),
    },
    Registry {
        label: "LBCTR",
        exact: &[r"(?i)LBCTR\s*\W*\d{10}"],
        prefixes: &[r"(?i)\bLBCTR"],
        name: Some(r"(?i)Lebanese Clinical Trials Registry"),
    },
    Registry {
        label: "SLCTR",
        exact: &[r"(?i)SLCTR\s*\W*\d{4}\s*\W*\d{3}"],
        prefixes: &[r"(?i)\bSLCTR"],
        name: Some(r"(?i)Sri Lanka Clinical Trials Registry"),
    },
    Registry {
        label: "TCTR",
        exact: &[r"(?i)TCTR\s*\W*202\d{8}"],
        prefixes: &[r"(?i)\bTCTR"],
        name: Some(r"(?i)Thai Clinical Trials Registry"),
    },
    Registry {
        label: "PER",
        // The published list carries a malformed inline flag (`{?i}`), which
        // reads as an optional literal `{` followed by `i}`. Kept as written so
        // screening results stay reproducible; it does not match bare PER IDs.
        exact: &[r"\{?i\}PER\s*\W*\d{3}\s*\W*\d{2}"],
        // No prefix: no relevant Peruvian trials and `\bPER\d*\b` floods with
        // false positives.
        prefixes: &[],
        name: Some(r"(?i)Peruvian Clinical Trial Registry"),
    },
];

/// All pattern sources of one kind with the label of the owning registry,
/// in catalogue order
pub fn pattern_sources(kind: PatternKind) -> Vec<(&'static str, &'static str)> {
    REGISTRIES
        .iter()
        .flat_map(|r| r.patterns(kind).iter().map(move |p| (r.label, *p)))
        .collect()
}

/// Look up a registry by label (case-insensitive)
pub fn find_registry(label: &str) -> Option<&'static Registry> {
    REGISTRIES
        .iter()
        .find(|r| r.label.eq_ignore_ascii_case(label))
}
