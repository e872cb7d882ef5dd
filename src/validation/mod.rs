pub mod email;
pub mod schedule;
pub mod slug;

pub use email::{normalize_email, validate_email};
pub use schedule::{normalize_date, normalize_time};
pub use slug::slugify;

use crate::error::ValidationError;

/// Trims a required text field, treating blank input as missing.
pub fn required_text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::required(field))
}

/// Trims every entry, drops blank ones and requires at least one to remain.
pub fn non_empty_list(field: &'static str, values: Option<&[String]>) -> Result<Vec<String>, ValidationError> {
    let values = values.ok_or_else(|| ValidationError::required(field))?;

    let cleaned: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if cleaned.is_empty() {
        return Err(ValidationError::new(
            field,
            format!("{} must contain at least one item", field),
        ));
    }

    Ok(cleaned)
}
