//! Centralized validation and limits.

/// Maximum number of rows accepted from a single table (DOS protection)
pub const MAX_TABLE_ROWS: usize = 1_000_000;

/// Maximum length of a structure string; longer strings are parse failures
pub const MAX_STRUCTURE_LENGTH: usize = 4096;

/// Maximum length of a disease code or region query
pub const MAX_QUERY_LENGTH: usize = 256;

/// Input validation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("The {0} field must not be blank")]
    BlankField(&'static str),
    #[error("The {field} field exceeds the maximum of {MAX_QUERY_LENGTH} characters")]
    FieldTooLong { field: &'static str },
    #[error("The {0} field contains control characters")]
    InvalidCharacters(&'static str),
    #[error("Similarity threshold must be between 0 and 1, got {0}")]
    ThresholdOutOfRange(f64),
}

/// Validate a free-text query field (disease code or region).
///
/// Returns the trimmed value. Blank values are rejected: a blank needle would
/// match every row of the table.
///
/// # Errors
///
/// Returns `ValidationError::BlankField` if nothing remains after trimming,
/// `ValidationError::FieldTooLong` if the value exceeds [`MAX_QUERY_LENGTH`], or
/// `ValidationError::InvalidCharacters` if it contains control characters.
///
/// # Examples
///
/// ```
/// use phyto_match::utils::validation::{validate_query_field, ValidationError};
///
/// assert_eq!(validate_query_field("disease", " M79 ").unwrap(), "M79");
/// assert_eq!(
///     validate_query_field("region", "   "),
///     Err(ValidationError::BlankField("region"))
/// );
/// ```
pub fn validate_query_field(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    if value.chars().count() > MAX_QUERY_LENGTH {
        return Err(ValidationError::FieldTooLong { field });
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidCharacters(field));
    }
    Ok(value.to_string())
}

/// Validate a similarity threshold.
///
/// # Errors
///
/// Returns `ValidationError::ThresholdOutOfRange` for values outside `[0, 1]` or NaN.
pub fn validate_threshold(threshold: f64) -> Result<f64, ValidationError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(ValidationError::ThresholdOutOfRange(threshold))
    }
}
