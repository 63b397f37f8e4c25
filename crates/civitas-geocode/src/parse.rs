//! Rule-based component extraction from free-text addresses.
//!
//! Intake addresses are free-text Spanish strings with no schema, so
//! extraction is an ordered pattern chain — first match wins — rather than a
//! grammar. The pattern lists are data so they can be extended and
//! enumerated by tests without touching the orchestration.

use regex::Regex;

use crate::types::{valid_postal_code, AddressComponents};

/// House-number patterns, tried in order. Explicit markers win over bare
/// numbers, and captures are capped at four digits so a postal code is never
/// mistaken for an exterior number. The `bool` marks patterns whose match
/// must be re-checked against [`POSTAL_MARKERS`] in the following text.
const NUMBER_PATTERNS: &[(&str, bool)] = &[
    (r"\bcasa\s+(\d{1,4})\b", false),
    (r"\bn[úu]m(?:ero)?\s+(\d{1,4})\b", false),
    (r"#\s*(\d{1,4})\b", false),
    (r"^(\d{1,4})\b", true),
    (r"\b(\d{1,4})\s*$", false),
];

/// A bare leading number followed by one of these is a postal-code marker,
/// not a house number.
const POSTAL_MARKERS: &[&str] = &["cp", "codigo", "código"];

/// Neighborhood patterns, tried in order. The capture runs to the next comma
/// or digit.
const NEIGHBORHOOD_PATTERNS: &[&str] = &[
    r"\b(?:fraccionamiento|fracc)\s+([^,\d]+)",
    r"\b(?:residencial|privada)\s+([^,\d]+)",
    r"\b(?:quintas|villas|jardines|bosques|lomas)\s+([^,\d]+)",
    r"\b(?:colonia|col)\s+([^,\d]+)",
];

/// Words removed from the leftover text before it becomes the street name.
const STREET_STOP_WORDS: &[&str] = &[
    "calle",
    "avenida",
    "av",
    "c",
    "de",
    "la",
    "del",
    "los",
    "las",
    "casa",
    "numero",
    "número",
    "num",
    "chihuahua",
    "cp",
    "codigo",
    "código",
];

/// Postal-code patterns for free-text enrichment; the `cp`-prefixed form is
/// preferred over a bare five-digit run.
const POSTAL_PATTERNS: &[&str] = &[r"\bcp\s*(\d{5})\b", r"\b(\d{5})\b"];

/// Components recovered from a residential address string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedComponents {
    pub number: Option<String>,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
}

/// Extracts `{number, street, neighborhood}` from a residential address.
///
/// The matched number and neighborhood substrings are removed from the
/// working text; whatever survives the stop-word filter, title-cased, is the
/// street name.
#[must_use]
pub fn parse_components(address: &str) -> ParsedComponents {
    let mut working = clean_for_parsing(address);
    let mut parsed = ParsedComponents::default();

    for (pattern, guard_following) in NUMBER_PATTERNS {
        let re = Regex::new(pattern).expect("valid regex");
        let Some(caps) = re.captures(&working) else {
            continue;
        };
        let whole = caps.get(0).expect("pattern has a match");
        if *guard_following {
            let following = working[whole.end()..].trim_start();
            if POSTAL_MARKERS
                .iter()
                .any(|marker| following.starts_with(marker))
            {
                continue;
            }
        }
        parsed.number = Some(caps[1].to_string());
        let range = whole.range();
        working.replace_range(range, " ");
        break;
    }
    working = collapse_whitespace(&working);

    for pattern in NEIGHBORHOOD_PATTERNS {
        let re = Regex::new(pattern).expect("valid regex");
        let Some(caps) = re.captures(&working) else {
            continue;
        };
        parsed.neighborhood = Some(caps[1].trim().to_string());
        let range = caps.get(0).expect("pattern has a match").range();
        working.replace_range(range, " ");
        break;
    }

    let street_words: Vec<&str> = working
        .split_whitespace()
        .filter(|word| word.len() > 1 && !STREET_STOP_WORDS.contains(word))
        .collect();
    if !street_words.is_empty() {
        parsed.street = Some(title_case(&street_words.join(" ")));
    }
    if let Some(neighborhood) = parsed.neighborhood.take() {
        parsed.neighborhood = Some(title_case(&neighborhood));
    }

    parsed
}

/// Enriches `components` from a provider's free-text formatted address.
/// Only missing fields are filled; structured provider fields always win.
pub fn fill_components_from_text(
    text: &str,
    municipality: &str,
    components: &mut AddressComponents,
) {
    let lowered = text.trim().to_lowercase();

    if components.numero.is_none() {
        let re = Regex::new(r"\b(\d{1,4})\b").expect("valid regex");
        if let Some(caps) = re.captures(&lowered) {
            components.numero = Some(caps[1].to_string());
        }
    }

    if components.codigo_postal.is_none() {
        for pattern in POSTAL_PATTERNS {
            let re = Regex::new(pattern).expect("valid regex");
            if let Some(caps) = re.captures(&lowered) {
                components.codigo_postal = valid_postal_code(&caps[1]);
                break;
            }
        }
    }

    if components.colonia.is_none() {
        for pattern in NEIGHBORHOOD_PATTERNS {
            let re = Regex::new(pattern).expect("valid regex");
            if let Some(caps) = re.captures(&lowered) {
                components.colonia = Some(title_case(caps[1].trim()));
                break;
            }
        }
    }

    if components.calle.is_none() {
        let mut street_text = lowered.clone();
        for pattern in POSTAL_PATTERNS {
            let re = Regex::new(pattern).expect("valid regex");
            street_text = re.replace_all(&street_text, " ").into_owned();
        }
        for pattern in NEIGHBORHOOD_PATTERNS {
            let re = Regex::new(pattern).expect("valid regex");
            street_text = re.replace_all(&street_text, " ").into_owned();
        }
        let municipality_lower = municipality.to_lowercase();
        street_text = street_text
            .split(',')
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .filter(|word| *word != municipality_lower)
            .collect::<Vec<_>>()
            .join(" ");
        if street_text.chars().count() > 2 {
            components.calle = Some(title_case(&street_text));
        }
    }
}

/// Strips punctuation except `#` (a live house-number marker) and collapses
/// whitespace, keeping letters, digits, and accents.
fn clean_for_parsing(address: &str) -> String {
    let replaced: String = address
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '#' {
                c
            } else {
                ' '
            }
        })
        .collect();
    collapse_whitespace(&replaced)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-cases the first letter of every word, leaving the rest untouched.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
