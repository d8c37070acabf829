//! Internal helpers for input normalization and conversion.
//!
//! These utilities are **not** part of the public API.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidInput(format!("invalid {label} id")))
}

/// Trim a required text field, rejecting blanks.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping blanks to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Add two minor-unit amounts, failing instead of overflowing.
pub(crate) fn add_minor(total: i64, amount: i64) -> ResultEngine<i64> {
    total
        .checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount("amount total overflows".to_string()))
}

/// Sum minor-unit amounts with [`add_minor`].
pub(crate) fn sum_minor(amounts: impl IntoIterator<Item = i64>) -> ResultEngine<i64> {
    amounts.into_iter().try_fold(0, add_minor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        assert!(normalize_required("   ", "description").is_err());
        assert_eq!(normalize_required(" Books ", "description").unwrap(), "Books");
    }

    #[test]
    fn sums_fail_on_overflow() {
        assert_eq!(sum_minor([1, 2, 3]).unwrap(), 6);
        assert_eq!(sum_minor([]).unwrap(), 0);
        assert!(matches!(
            sum_minor([i64::MAX / 2 + 1, i64::MAX / 2 + 1]),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn optional_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" card ")), Some("card".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }
}
