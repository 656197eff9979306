pub(crate) mod address_dto;
pub(crate) mod token_dto;
pub(crate) mod user_dto;

use validator::ValidationError;

/// Rejects values that are empty once surrounding whitespace is trimmed.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("MISSING"));
    }
    Ok(())
}
