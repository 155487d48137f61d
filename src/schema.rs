// 📐 Shape Layer - Draft Validation
// Checks drafts before they are admitted into a collection

use serde::Serialize;
use std::fmt;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// Entity the field belongs to, e.g. "HealthRecord"
    pub context: String,
}

impl ValidationError {
    pub fn new(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: context.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// FIELD RULES
// ============================================================================

/// Required text must contain something other than whitespace.
pub fn require_text(errors: &mut Vec<ValidationError>, context: &str, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(context, field, "Required field is empty"));
    }
}

/// NaN and infinities cannot be stored: serde_json writes them as `null`.
pub fn require_finite(errors: &mut Vec<ValidationError>, context: &str, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(ValidationError::new(
            context,
            field,
            format!("Must be a finite number, got {}", value),
        ));
    }
}

/// Numeric amounts must be finite and >= 0.
pub fn require_non_negative(errors: &mut Vec<ValidationError>, context: &str, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(ValidationError::new(
            context,
            field,
            format!("Must be a finite number, got {}", value),
        ));
    } else if value < 0.0 {
        errors.push(ValidationError::new(
            context,
            field,
            format!("Must not be negative, got {}", value),
        ));
    }
}

/// Join a list of errors into a single line for logs and terminal output.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
