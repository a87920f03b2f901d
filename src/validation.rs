//! Input normalisation shared by the command handlers.

use crate::error::CaseworkError;

/// Trims `value`, rejecting blank input.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String, CaseworkError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CaseworkError::validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Trims `value`, mapping blank input to `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}
