//! Field rules shared by create and update paths.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::derived::age_on;
use crate::domain::error::DomainError;

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 120;
pub const MIN_YEAR_BUILT: i32 = 1900;
pub const MAX_MESSAGE_LEN: usize = 1000;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Trimmed and lowercased; emails are unique case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn email(email: &str) -> Result<(), DomainError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(DomainError::validation("email", format!("'{email}' is not a valid email")))
    }
}

pub fn required(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(())
}

pub fn birth_date(birth: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
    if birth > today {
        return Err(DomainError::validation("birthDate", "must be in the past"));
    }
    let age = age_on(birth, today);
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(DomainError::validation(
            "birthDate",
            format!("age must be between {MIN_AGE} and {MAX_AGE}, got {age}"),
        ));
    }
    Ok(())
}

pub fn password(password: &str, min_len: usize) -> Result<(), DomainError> {
    if password.chars().count() < min_len {
        return Err(DomainError::validation(
            "password",
            format!("must be at least {min_len} characters"),
        ));
    }
    Ok(())
}

pub fn positive_int(field: &str, value: i32) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(field, "must be greater than 0"));
    }
    Ok(())
}

pub fn positive_number(field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(field, "must be greater than 0"));
    }
    Ok(())
}

pub fn year_built(year: i32, today: NaiveDate) -> Result<(), DomainError> {
    let max = today.year();
    if !(MIN_YEAR_BUILT..=max).contains(&year) {
        return Err(DomainError::validation(
            "yearBuilt",
            format!("must be between {MIN_YEAR_BUILT} and {max}"),
        ));
    }
    Ok(())
}

/// Returns the trimmed content.
pub fn message_content(content: &str) -> Result<String, DomainError> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_MESSAGE_LEN {
        return Err(DomainError::validation(
            "content",
            format!("must be 1 to {MAX_MESSAGE_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn emails() {
        assert!(email("ana@example.com").is_ok());
        assert!(email("ana@example").is_err());
        assert!(email("ana example@x.io").is_err());
        // a bare "@" is not enough
        assert!(email("ana@").is_err());
        assert!(email("@example.com").is_err());
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let today = d(2024, 5, 10);
        assert!(birth_date(d(2006, 5, 10), today).is_ok());
        assert!(birth_date(d(2006, 5, 11), today).is_err());
        assert!(birth_date(d(1904, 5, 10), today).is_ok());
        assert!(birth_date(d(1903, 5, 9), today).is_err());
        assert!(birth_date(d(2025, 1, 1), today).is_err());
    }

    #[test]
    fn flat_numbers() {
        let today = d(2024, 5, 10);
        assert!(year_built(1900, today).is_ok());
        assert!(year_built(2024, today).is_ok());
        assert!(year_built(2025, today).is_err());
        assert!(year_built(1899, today).is_err());
        assert!(positive_number("rentPrice", 0.0).is_err());
        assert!(positive_number("rentPrice", f64::NAN).is_err());
        assert!(positive_int("streetNumber", 1).is_ok());
    }

    #[test]
    fn message_length_counts_trimmed_chars() {
        assert_eq!(message_content("  hi  ").unwrap(), "hi");
        assert!(message_content("   ").is_err());
        assert!(message_content(&"x".repeat(1000)).is_ok());
        assert!(message_content(&"x".repeat(1001)).is_err());
    }
}
