//! Length bounds on free-text fields.

use crate::error::{EngineError, EngineResult};

/// Longest accepted request reason.
pub const MAX_REASON_LEN: usize = 1000;
/// Longest accepted proof reference.
pub const MAX_PROOF_LEN: usize = 500;
/// Longest accepted overtime task description.
pub const MAX_TASK_DESCRIPTION_LEN: usize = 1000;
/// Longest accepted review note.
pub const MAX_REVIEW_NOTE_LEN: usize = 500;
/// Longest accepted check-in or check-out note.
pub const MAX_NOTES_LEN: usize = 1000;

/// Rejects a value longer than `max` characters.
pub fn check_len(field: &str, value: Option<&str>, max: usize) -> EngineResult<()> {
    match value {
        Some(text) if text.chars().count() > max => Err(EngineError::validation(
            field,
            format!("must be at most {} characters", max),
        )),
        _ => Ok(()),
    }
}

/// Trims `value` and rejects it when blank or longer than `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> EngineResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(field, "is required"));
    }
    check_len(field, Some(trimmed), max)?;
    Ok(trimmed.to_string())
}

/// Trims an optional value, mapping blank to `None`, and bounds its length.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> EngineResult<Option<String>> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty());
    check_len(field, trimmed, max)?;
    Ok(trimmed.map(str::to_string))
}
