//! Registry catalogue integration tests

use rstest::rstest;
use trialscan_identifiers::{
    ids_exact, pattern_sources, prefixes, registry_names, scan_document, search_text,
    PatternKind, PatternList,
};

/// Number of hits each single exact-ID pattern finds in `text`
fn hits_per_pattern(text: &str) -> Vec<(&'static str, usize)> {
    pattern_sources(PatternKind::Exact)
        .into_iter()
        .map(|(label, source)| {
            let list = PatternList::compile(PatternKind::Exact, &[source]).unwrap();
            let count = search_text(&list, Some(text)).map_or(0, |h| h.len());
            (label, count)
        })
        .collect()
}

// === Exact IDs ===

#[rstest]
#[case(0, "NCT04280705")]
#[case(1, "2020-001113-21")]
#[case(2, "PACTR201911512345678")]
#[case(3, "ACTRN12620000445976")]
#[case(4, "ANZCTR12620000445976")]
#[case(5, "NTR8492")]
#[case(6, "KCT0005123")]
#[case(7, "DRKS00021238")]
#[case(8, "ISRCTN83971151")]
#[case(9, "ChiCTR2000029308")]
#[case(10, "IRCT2015122702572N1")]
#[case(11, "CTRI/2020/04/024883")]
#[case(12, "JapicCTI-205238")]
#[case(13, "jRCT2031200023")]
#[case(14, "UMIN000040276")]
#[case(15, "JMA-IIA00346")]
#[case(16, "RBR-8f7g2m")]
#[case(17, "RPCEC00000309")]
#[case(18, "LBCTR2020043495")]
#[case(19, "SLCTR/2020/010")]
#[case(20, "TCTR20200404004")]
fn test_exact_id_hits_only_its_pattern(#[case] index: usize, #[case] id: &str) {
    let text = format!("This study was registered as {} in May.", id);
    let counts = hits_per_pattern(&text);

    for (i, (label, count)) in counts.iter().enumerate() {
        let expected = usize::from(i == index);
        assert_eq!(*count, expected, "pattern {} ({}) on {:?}", i, label, text);
    }
}

#[rstest]
#[case("NCT04280705")]
#[case("ChiCTR2000029308")]
#[case("ISRCTN83971151")]
#[case("DRKS00021238")]
#[case("CTRI/2020/04/024883")]
#[case("JapicCTI-205238")]
#[case("TCTR20200404004")]
fn test_exact_id_case_insensitive(#[case] id: &str) {
    let upper = format!("THIS STUDY WAS REGISTERED AS {}.", id.to_uppercase());
    let lower = format!("this study was registered as {}.", id.to_lowercase());

    let upper_hits = search_text(ids_exact(), Some(&upper)).unwrap();
    let lower_hits = search_text(ids_exact(), Some(&lower)).unwrap();

    assert_eq!(upper_hits, vec![id.to_uppercase()]);
    assert_eq!(lower_hits, vec![id.to_lowercase()]);
}

#[test]
fn test_id_with_separator() {
    let hits = search_text(ids_exact(), Some("Registration: NCT 04280705")).unwrap();
    assert_eq!(hits, vec!["NCT 04280705"]);
}

#[test]
fn test_peruvian_pattern_kept_as_published() {
    // The published Peruvian pattern needs a literal `i}` before PER.
    assert_eq!(search_text(ids_exact(), Some("See PER-027-20.")), None);
    assert_eq!(
        search_text(ids_exact(), Some("See i}PER-027-20.")),
        Some(vec!["i}PER-027-20".to_string()])
    );
}

#[test]
fn test_malformed_ids_caught_by_prefix() {
    let text = "Registered at NCT0428 (truncated) and ChiCTR-IOR-17011234.";
    assert_eq!(search_text(ids_exact(), Some(text)), None);
    assert_eq!(
        search_text(prefixes(), Some(text)),
        Some(vec!["NCT".to_string(), "ChiCTR".to_string()])
    );
}

#[test]
fn test_prefix_needs_word_boundary() {
    assert_eq!(search_text(prefixes(), Some("the UNCTAD report")), None);
}

// === Registry names ===

#[rstest]
#[case("Chinese Clinical Trial Registry")]
#[case("german clinical trials register")]
#[case("PAN AFRICAN CLINICAL TRIAL REGISTRY")]
#[case("Clinical Trials Registry-India")]
fn test_registry_names(#[case] name: &str) {
    let text = format!("The protocol was deposited in the {}.", name);
    assert_eq!(
        search_text(registry_names(), Some(&text)),
        Some(vec![name.to_string()])
    );
}

#[test]
fn test_anzctr_name_is_case_sensitive() {
    let text = "australian new zealand clinical trials registry";
    assert_eq!(search_text(registry_names(), Some(text)), None);
    let text = "Australian New Zealand Clinical Trials Registry";
    assert!(search_text(registry_names(), Some(text)).is_some());
}

// === Document scans ===

#[test]
fn test_empty_text_is_sentinel_for_all_lists() {
    for text in [None, Some("")] {
        let hits = scan_document(text);
        assert!(hits.id_hits.is_none());
        assert!(hits.prefix_hits.is_none());
        assert!(hits.reg_name_hits.is_none());
    }
}

#[test]
fn test_union_is_order_independent() {
    let text = "Trials NCT04280705, ISRCTN83971151 and DRKS00021238 were pooled.";
    let forward: Vec<&str> = pattern_sources(PatternKind::Exact)
        .into_iter()
        .map(|(_, s)| s)
        .collect();
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = PatternList::compile(PatternKind::Exact, &forward).unwrap();
    let b = PatternList::compile(PatternKind::Exact, &reversed).unwrap();

    let mut hits_a = search_text(&a, Some(text)).unwrap();
    let mut hits_b = search_text(&b, Some(text)).unwrap();
    hits_a.sort();
    hits_b.sort();
    assert_eq!(hits_a, hits_b);
    assert_eq!(hits_a.len(), 3);
}

#[test]
fn test_repeated_ids_are_not_deduplicated() {
    let text = "NCT04280705 ... as above, NCT04280705.";
    let hits = scan_document(Some(text));
    assert_eq!(hits.id_hits.map(|h| h.len()), Some(2));
}

#[test]
fn test_hits_serialize() {
    let hits = scan_document(Some("ISRCTN83971151"));
    let json = serde_json::to_value(&hits).unwrap();
    assert_eq!(json["id_hits"][0], "ISRCTN83971151");
    assert!(json["reg_name_hits"].is_null());
}
