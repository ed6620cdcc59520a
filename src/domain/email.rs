//! E-mail address rules shared by contacts, specialists and billing recipients.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Loose RFC-style check: something, `@`, something, `.`, something, no whitespace.
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

/// Canonical form used for uniqueness comparisons.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("ok@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.com.br"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("bad"));
        assert!(!is_valid_email("no-domain@"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Ana@Empresa.COM "), "ana@empresa.com");
    }
}
