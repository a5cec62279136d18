//! Small input helpers shared by the HTTP modules and services.

use chrono::{DateTime, NaiveDate, Utc};
use validator::ValidateEmail;

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Names of the required fields that are absent or blank.
pub fn missing_fields(fields: &[(&str, Option<&str>)]) -> Vec<String> {
    fields
        .iter()
        .filter(|(_, value)| non_blank(*value).is_none())
        .map(|(name, _)| (*name).to_string())
        .collect()
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid_email(value: &str) -> bool {
    value.trim().validate_email()
}

/// List filters treat a blank value or "todos" as "no filter".
pub fn normalize_filter(value: Option<&str>) -> Option<String> {
    non_blank(value)
        .filter(|v| !v.eq_ignore_ascii_case("todos"))
        .map(str::to_string)
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_flexible_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Case-insensitive substring match used by in-memory search filters.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn missing_fields_reports_blank_and_absent() {
        let missing = missing_fields(&[("a", Some("x")), ("b", Some("  ")), ("c", None)]);
        assert_eq!(missing, vec!["b", "c"]);
    }

    #[test]
    fn filters_ignore_todos() {
        assert_eq!(normalize_filter(Some("todos")), None);
        assert_eq!(normalize_filter(Some("TODOS")), None);
        assert_eq!(normalize_filter(Some(" ativo ")), Some("ativo".to_string()));
        assert_eq!(normalize_filter(None), None);
    }

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        let d = parse_flexible_date("2025-03-01").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2025, 3, 1));
        let t = parse_flexible_date("2025-03-01T12:00:00-03:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2025-03-01T15:00:00+00:00");
        assert!(parse_flexible_date("01/03/2025").is_none());
    }

    #[test]
    fn digits_and_email() {
        assert_eq!(digits_only("123.456.789-09"), "12345678909");
        assert!(is_valid_email("ana@example.com"));
        assert!(!is_valid_email("ana@"));
    }
}
