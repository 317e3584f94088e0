//! Validation Utilities

use validator::{ValidationError, ValidationErrors};

use super::error::FieldError;

/// Flatten validation errors into field errors.
///
/// `priority` lists field names in the order they should be reported; fields
/// not listed follow in name order. Keeps reporting stable regardless of the
/// hash order inside `ValidationErrors`.
pub fn field_errors(errors: &ValidationErrors, priority: &[&str]) -> Vec<FieldError> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| {
        let rank = priority
            .iter()
            .position(|p| *p == field.as_ref())
            .unwrap_or(priority.len());
        (rank, field.to_string())
    });

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
            })
        })
        .collect()
}

/// Reject empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
