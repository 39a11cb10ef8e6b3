//! Customer model, keyed by phone number.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Normalized phone number, see [`normalize_phone`].
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Normalize a phone number to digits with an optional leading `+`.
///
/// Spaces, dashes, dots and parentheses are stripped. The result must have
/// between 7 and 15 digits.
pub fn normalize_phone(raw: &str) -> crate::Result<String> {
    let trimmed = raw.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for ch in rest.chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(AppError::validation(format!("Malformed phone number: '{raw}'"))),
        }
    }

    if !(7..=15).contains(&digits.len()) {
        return Err(AppError::validation(format!(
            "Phone number must have 7 to 15 digits: '{raw}'"
        )));
    }

    Ok(format!("{plus}{digits}"))
}

/// Light email sanity check; empty input means no email.
pub fn normalize_email(raw: Option<&str>) -> crate::Result<Option<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(email) => {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if valid {
                Ok(Some(email.to_lowercase()))
            } else {
                Err(AppError::validation(format!("Malformed email address: '{email}'")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("(555) 123-4567").unwrap(), "5551234567");
        assert_eq!(normalize_phone(" +44 20 7946 0958 ").unwrap(), "+442079460958");
    }

    #[test]
    fn test_malformed_phone_rejected() {
        assert!(normalize_phone("12345").is_err());
        assert!(normalize_phone("555-CALL-NOW").is_err());
        assert!(normalize_phone("").is_err());
        assert!(normalize_phone("1234567890123456").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(None).unwrap(), None);
        assert_eq!(normalize_email(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_email(Some("Ana@Example.com")).unwrap(),
            Some("ana@example.com".to_string())
        );
        assert!(normalize_email(Some("not-an-email")).is_err());
    }
}
