use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Calendar month in `YYYY-MM` form, month 01-12
    /// - Valid: "2024-06", "1999-12"
    /// - Invalid: "2024-6", "2024-13", "24-06", "2024-06-01"
    pub static ref MONTH_REGEX: Regex = Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_regex_valid() {
        assert!(MONTH_REGEX.is_match("2024-06"));
        assert!(MONTH_REGEX.is_match("1999-12"));
        assert!(MONTH_REGEX.is_match("2025-01"));
    }

    #[test]
    fn test_month_regex_invalid() {
        assert!(!MONTH_REGEX.is_match("2024-6")); // single digit month
        assert!(!MONTH_REGEX.is_match("2024-13")); // out of range
        assert!(!MONTH_REGEX.is_match("2024-00"));
        assert!(!MONTH_REGEX.is_match("24-06"));
        assert!(!MONTH_REGEX.is_match("2024-06-01")); // full date
        assert!(!MONTH_REGEX.is_match(""));
    }
}
