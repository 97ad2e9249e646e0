//! Sponsor name normalization

use unicode_normalization::UnicodeNormalization;

use crate::RawValue;

/// Fold a name to ASCII.
///
/// Non-ASCII characters are transliterated to their closest ASCII spelling,
/// then any remaining combining marks are dropped. ASCII input is returned
/// unchanged, so the function is idempotent.
pub fn normalize_name(name: &str) -> String {
    if name.is_ascii() {
        return name.to_string();
    }
    let transliterated = deunicode::deunicode_with_tofu(name, "");
    transliterated
        // NFKD to separate combining characters
        .nfkd()
        .filter(char::is_ascii)
        .collect()
}

/// Normalize a sponsor cell. Non-text values pass through unchanged.
pub fn norm_names(value: RawValue) -> RawValue {
    match value {
        RawValue::Text(name) => RawValue::Text(normalize_name(&name)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diacritics_stripped() {
        assert_eq!(normalize_name("Côte d'Ivoire"), "Cote d'Ivoire");
        assert_eq!(normalize_name("Hôpital Universitaire de Genève"), "Hopital Universitaire de Geneve");
        assert_eq!(normalize_name("Universität Tübingen"), "Universitat Tubingen");
    }

    #[test]
    fn test_transliteration() {
        assert_eq!(normalize_name("Łódź"), "Lodz");
        assert_eq!(normalize_name("Ørsted"), "Orsted");
    }

    #[test]
    fn test_ascii_unchanged() {
        assert_eq!(normalize_name("Oxford University"), "Oxford University");
    }

    #[test]
    fn test_non_text_passes_through() {
        assert_eq!(norm_names(RawValue::Missing), RawValue::Missing);
        assert_eq!(norm_names(RawValue::Float(1.5)), RawValue::Float(1.5));
        assert_eq!(
            norm_names(RawValue::Text("São Paulo".to_string())),
            RawValue::Text("Sao Paulo".to_string())
        );
    }
}
