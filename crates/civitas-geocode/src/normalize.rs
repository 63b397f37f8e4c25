//! Address normalization and query classification.
//!
//! Normalization is deliberately shallow: lower-case, collapse whitespace,
//! expand the abbreviation vocabulary the intake forms actually see. Accents
//! are preserved — providers in this region handle them fine and stripping
//! them loses information.

use regex::Regex;

/// Abbreviation-expansion table, ordered longest first so multi-letter
/// abbreviations (`fracc.`) are never touched by the shorter rules (`c.`).
/// Matching is token-anchored: an abbreviation only expands at the start of
/// a whitespace-separated token.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("fracc.", "fraccionamiento"),
    ("blvd.", "boulevard"),
    ("prol.", "prolongación"),
    ("calz.", "calzada"),
    ("carr.", "carretera"),
    ("priv.", "privada"),
    ("núm.", "número"),
    ("ave.", "avenida"),
    ("col.", "colonia"),
    ("av.", "avenida"),
    ("no.", "número"),
    ("c.", "calle"),
];

/// Residential markers: subdivision vocabulary plus house-number cues.
const RESIDENTIAL_KEYWORDS: &[&str] = &[
    "casa",
    "num",
    "número",
    "#",
    "fraccionamiento",
    "fracc",
    "residencial",
    "privada",
    "quintas",
    "villas",
    "jardines",
    "bosques",
    "lomas",
    "cerrada",
    "andador",
    "retorno",
];

/// Ordered patterns that signal an exterior (house) number is present.
const STREET_NUMBER_PATTERNS: &[&str] = &[
    r"número\s+\d+",
    r"\bno\s+\d+",
    r"#\s*\d+",
    r"\d+",
];

/// Lower-cases, trims, expands abbreviations, and collapses whitespace.
///
/// Idempotent: no expansion target contains an abbreviation, so running the
/// result through again is a no-op.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let expanded = lowered
        .split_whitespace()
        .map(expand_token)
        .collect::<Vec<_>>()
        .join(" ");

    // '#' glues itself to the number it marks ("#123"), so it is replaced
    // after token expansion and the whitespace collapsed once more.
    let replaced = expanded.replace('#', "número ");
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn expand_token(token: &str) -> String {
    for (abbrev, full) in ABBREVIATIONS {
        if let Some(rest) = token.strip_prefix(abbrev) {
            if rest.is_empty() {
                return (*full).to_string();
            }
            // "av.juárez" and similar glued forms.
            return format!("{full} {rest}");
        }
    }
    token.to_string()
}

/// True iff the trimmed input is exactly five digits (a postal code).
#[must_use]
pub fn is_postal_code(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.len() == 5 && trimmed.bytes().all(|b| b.is_ascii_digit())
}

/// True iff the input carries an exterior number in any recognized form.
#[must_use]
pub fn has_street_number(s: &str) -> bool {
    let lowered = s.to_lowercase();
    STREET_NUMBER_PATTERNS
        .iter()
        .any(|pattern| Regex::new(pattern).expect("valid regex").is_match(&lowered))
}

/// Classifies an address as residential: it must carry a digit AND either a
/// residential keyword or enough tokens (≥3) to look like a full street
/// address rather than a bare landmark.
#[must_use]
pub fn is_residential(s: &str) -> bool {
    let lowered = s.to_lowercase();
    if !lowered.bytes().any(|b| b.is_ascii_digit()) {
        return false;
    }
    let has_keyword = RESIDENTIAL_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword));
    has_keyword || lowered.split_whitespace().count() >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // normalize
    // -----------------------------------------------------------------------

    #[test]
    fn normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(
            normalize("  Calle   JUÁREZ   123 "),
            "calle juárez 123"
        );
    }

    #[test]
    fn normalize_expands_common_abbreviations() {
        assert_eq!(
            normalize("Av. Independencia No. 100"),
            "avenida independencia número 100"
        );
        assert_eq!(normalize("Blvd. Ortiz Mena"), "boulevard ortiz mena");
        assert_eq!(normalize("C. Aldama"), "calle aldama");
    }

    #[test]
    fn normalize_does_not_corrupt_longer_abbreviations() {
        // "fracc." must expand as a whole; the "c." rule never sees it.
        assert_eq!(
            normalize("Fracc. Las Quintas"),
            "fraccionamiento las quintas"
        );
        assert_eq!(normalize("Col. San Felipe"), "colonia san felipe");
    }

    #[test]
    fn normalize_replaces_hash_with_numero() {
        assert_eq!(normalize("Calle Aldama #123"), "calle aldama número 123");
    }

    #[test]
    fn normalize_preserves_accents() {
        assert_eq!(normalize("Prol. Teófilo Borunda"), "prolongación teófilo borunda");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("Av. Universidad #456, Col. Centro");
        assert_eq!(normalize(&once), once);
    }

    // -----------------------------------------------------------------------
    // is_postal_code
    // -----------------------------------------------------------------------

    #[test]
    fn postal_code_is_exactly_five_digits() {
        assert!(is_postal_code("31000"));
        assert!(is_postal_code("  31203  "));
        assert!(!is_postal_code("3100"));
        assert!(!is_postal_code("310001"));
        assert!(!is_postal_code("31 000"));
        assert!(!is_postal_code("calle 31000"));
    }

    // -----------------------------------------------------------------------
    // has_street_number
    // -----------------------------------------------------------------------

    #[test]
    fn street_number_detected_in_any_form() {
        assert!(has_street_number("Calle Juárez 123"));
        assert!(has_street_number("número 45"));
        assert!(has_street_number("#12"));
        assert!(!has_street_number("Avenida Universidad"));
    }

    // -----------------------------------------------------------------------
    // is_residential
    // -----------------------------------------------------------------------

    #[test]
    fn residential_requires_a_digit() {
        assert!(!is_residential("fraccionamiento las quintas"));
    }

    #[test]
    fn residential_with_keyword_and_digit() {
        assert!(is_residential("casa 45 las quintas"));
        assert!(is_residential("privada del sol 12"));
    }

    #[test]
    fn residential_with_three_tokens_and_digit() {
        // No keyword, but enough structure to be a street address.
        assert!(is_residential("juárez 123 centro"));
        assert!(!is_residential("juárez 123"));
    }
}
