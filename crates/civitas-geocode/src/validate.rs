//! Pre-flight syntactic address validation.
//!
//! A cheap guard run before any network call. It knows nothing about
//! geocoding — it only rejects input that cannot possibly be an address, so
//! the chain never spends round-trips on garbage.

use regex::Regex;

use crate::error::GeocodeError;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 200;

/// Latin letters (including Spanish accented vowels and ñ/ü), digits,
/// whitespace, and the punctuation that appears in written addresses.
const ALLOWED_PATTERN: &str = r"^[a-zA-ZáéíóúñüÁÉÍÓÚÑÜ0-9\s.,#\-/]+$";

/// Validates address syntax.
///
/// # Errors
///
/// Returns [`GeocodeError::InvalidAddress`] when the input is empty, too
/// short, too long, consists only of digits and punctuation (a misentered
/// coordinate pair, most likely), or contains characters outside the allowed
/// set.
pub fn validate_address(address: &str) -> Result<(), GeocodeError> {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return invalid("address is empty");
    }
    if trimmed.chars().count() < MIN_LEN {
        return invalid("address must be at least 3 characters");
    }
    if trimmed.chars().count() > MAX_LEN {
        return invalid("address is too long (max 200 characters)");
    }

    let without_punctuation: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | ' ' | '-' | '/'))
        .collect();
    if !without_punctuation.is_empty()
        && without_punctuation.bytes().all(|b| b.is_ascii_digit())
    {
        return invalid("address contains only digits and punctuation");
    }

    let allowed = Regex::new(ALLOWED_PATTERN).expect("valid regex");
    if !allowed.is_match(trimmed) {
        return invalid("address contains invalid characters");
    }

    Ok(())
}

fn invalid(reason: &str) -> Result<(), GeocodeError> {
    Err(GeocodeError::InvalidAddress {
        reason: reason.to_string(),
    })
}
