//! Postal code format checks

use std::sync::OnceLock;

use regex::Regex;

/// Five ASCII digits, optionally followed by a dash or whitespace and four more
const POSTAL_CODE_PATTERN: &str = r"^[0-9]{5}(?:[-\t\n\x0C\r ][0-9]{4})?$";

static POSTAL_CODE: OnceLock<Regex> = OnceLock::new();

fn postal_code_regex() -> &'static Regex {
    POSTAL_CODE.get_or_init(|| Regex::new(POSTAL_CODE_PATTERN).expect("postal code pattern compiles"))
}

/// Returns true if `candidate` is a 5-digit postal code with optional
/// 4-digit extension
pub fn is_valid_postal_code(candidate: &str) -> bool {
    postal_code_regex().is_match(candidate)
}

/// The 5-digit base of a valid postal code
pub fn base_postal_code(candidate: &str) -> Option<&str> {
    if is_valid_postal_code(candidate) {
        candidate.get(..5)
    } else {
        None
    }
}
