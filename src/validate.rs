use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;

/// One failed rule on one form field, with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

lazy_static! {
    pub static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z\s\-'.]+$").unwrap();
    pub static ref AGE_RE: Regex = Regex::new(r"^[a-zA-Z0-9\s\-'.]+$").unwrap();
    pub static ref BREED_RE: Regex = Regex::new(r"^[a-zA-Z\s\-'.,&]+$").unwrap();
    pub static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    pub static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    pub static ref LOCATION_RE: Regex = Regex::new(r"^[a-zA-Z0-9\s\-'.,]+$").unwrap();
    pub static ref JOB_TITLE_RE: Regex = Regex::new(r"^[a-zA-Z0-9\s\-'.,&]+$").unwrap();
}

/// Parse a `datetime-local` form value. Browsers normally post minute
/// precision but some include seconds.
pub fn parse_form_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Character-class checks standing in for the usual look-ahead password
/// pattern, which the regex engine here does not support.
pub fn password_meets_complexity(value: &str) -> bool {
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| "@$!%*?&".contains(c));
    has_lower && has_upper && has_digit && has_special
}

pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_pattern_accepts_typical_names() {
        assert!(NAME_RE.is_match("Mary-Jane O'Neil Jr."));
        assert!(!NAME_RE.is_match("R2D2"));
    }

    #[test]
    fn email_pattern() {
        assert!(EMAIL_RE.is_match("admin@company.com"));
        assert!(!EMAIL_RE.is_match("not-an-email"));
        assert!(!EMAIL_RE.is_match("missing@tld"));
    }

    #[test]
    fn datetime_accepts_minute_and_second_precision() {
        assert!(parse_form_datetime("2024-01-15T08:30").is_some());
        assert!(parse_form_datetime("2024-01-15T08:30:15").is_some());
        assert!(parse_form_datetime("15/01/2024 08:30").is_none());
    }

    #[test]
    fn password_complexity_requires_all_classes() {
        assert!(password_meets_complexity("Admin123!"));
        assert!(password_meets_complexity("Str0ng&pass"));
        assert!(!password_meets_complexity("alllowercase1&"));
        assert!(!password_meets_complexity("NoDigitsHere&"));
        assert!(!password_meets_complexity("NoSpecial123"));
    }
}
