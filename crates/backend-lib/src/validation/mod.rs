// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request field validation.
//!
//! Every check here runs before the request touches the store.

use crate::error::AppError;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, AppError>;

/// Require a present, non-empty field from a request body.
pub fn required<'a>(value: Option<&'a str>, field: &'static str) -> ValidationResult<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::MissingField(field)),
    }
}

/// Require a non-empty value that has already been extracted.
pub fn non_empty<'a>(value: &'a str, field: &'static str) -> ValidationResult<&'a str> {
    required(Some(value), field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_accepts_present_value() {
        assert_eq!(required(Some("a@x.com"), "email").unwrap(), "a@x.com");
        // whitespace is a value; only absence and "" are missing
        assert_eq!(non_empty(" ", "title").unwrap(), " ");
    }

    #[test]
    fn test_required_rejects_absent_or_empty() {
        assert!(matches!(required(None, "email"), Err(AppError::MissingField("email"))));
        assert!(matches!(
            required(Some(""), "password"),
            Err(AppError::MissingField("password"))
        ));
        assert!(matches!(non_empty("", "content"), Err(AppError::MissingField("content"))));
    }
}
