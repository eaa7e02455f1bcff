//! Field validation helpers shared by entity constructors.
//!
//! Text is trimmed before checking. Optional fields that are empty after
//! trimming normalize to `None`, so `""` and `null` mean the same thing.

use crate::errors::{DomainError, Result};

/// Maximum length of a short code.
pub const SHORT_CODE_MAX: usize = 8;

/// Validate a required text field: non-empty after trimming, at most `max` chars.
pub fn required(field: &str, value: &str, max: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate an optional text field, normalizing blank values to `None`.
pub fn optional(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => Err(DomainError::validation(
            field,
            format!("must be at most {max} characters"),
        )),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Apply a patch value to an optional text field; `None` leaves it unchanged.
pub fn patch_optional(
    target: &mut Option<String>,
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<()> {
    if value.is_some() {
        *target = optional(field, value, max)?;
    }
    Ok(())
}

/// Validate an optional short code: up to [`SHORT_CODE_MAX`] ASCII alphanumerics.
pub fn short_code(value: Option<&str>) -> Result<Option<String>> {
    let Some(code) = optional("short_code", value, SHORT_CODE_MAX)? else {
        return Ok(None);
    };
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::validation(
            "short_code",
            "must contain only letters and digits",
        ));
    }
    Ok(Some(code))
}

/// Reject negative numbers.
pub fn non_negative(field: &str, value: i64) -> Result<i64> {
    if value < 0 {
        return Err(DomainError::validation(field, "must not be negative"));
    }
    Ok(value)
}

/// Reject zero and negative numbers.
pub fn positive(field: &str, value: i64) -> Result<i64> {
    if value <= 0 {
        return Err(DomainError::validation(field, "must be positive"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn required_trims() {
        assert_eq!(required("name", "  Drill  ", 10).unwrap(), "Drill");
    }

    #[test]
    fn required_rejects_blank() {
        let err = required("name", "   ", 10).unwrap_err();
        assert_matches!(err, DomainError::Validation { ref field, .. } if field == "name");
    }

    #[test]
    fn required_counts_chars_not_bytes() {
        assert!(required("name", "ééééé", 5).is_ok());
        assert!(required("name", "éééééé", 5).is_err());
    }

    #[test]
    fn optional_normalizes_blank_to_none() {
        assert_eq!(optional("notes", Some("  "), 10).unwrap(), None);
        assert_eq!(optional("notes", None, 10).unwrap(), None);
        assert_eq!(optional("notes", Some(" hi "), 10).unwrap(), Some("hi".into()));
        assert!(optional("notes", Some("too long text"), 5).is_err());
    }

    #[test]
    fn short_code_rules() {
        assert_eq!(short_code(Some("A1")).unwrap(), Some("A1".into()));
        assert_eq!(short_code(Some("")).unwrap(), None);
        assert!(short_code(Some("A-1")).is_err());
        assert!(short_code(Some("ABCDEFGHI")).is_err());
    }

    #[test]
    fn numeric_rules() {
        assert_eq!(non_negative("quantity", 0).unwrap(), 0);
        assert!(non_negative("quantity", -1).is_err());
        assert_eq!(positive("quantity", 3).unwrap(), 3);
        assert!(positive("quantity", 0).is_err());
    }
}
