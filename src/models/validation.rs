//! Field validation
//!
//! Predicates that gate entity construction and mutation. Constructors use the
//! `check_*` forms so a failure names the offending field; setters use the
//! boolean forms and leave the prior value in place on failure.

use std::fmt;

use thiserror::Error;

use super::CategoryKind;

/// A validated entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Instructions,
    Note,
    Fat,
    Carbohydrates,
    Protein,
    Calories,
    Measurement,
    Grams,
    PortionAmount,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Instructions => "instructions",
            Field::Note => "note",
            Field::Fat => "fat",
            Field::Carbohydrates => "carbohydrates",
            Field::Protein => "protein",
            Field::Calories => "calories",
            Field::Measurement => "measurement",
            Field::Grams => "grams",
            Field::PortionAmount => "portion amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction-time validation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: Field },

    #[error("{field} must not be a number, got '{value}'")]
    Numeric { field: Field, value: String },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: Field, value: f64 },

    #[error("portion amount must be at least 1, got {0}")]
    PortionAmount(i32),

    #[error("{entity} requires category kind '{expected}', got '{actual}'")]
    CategoryKind {
        entity: &'static str,
        expected: CategoryKind,
        actual: CategoryKind,
    },
}

/// Result type for validated construction
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Finite number literal, optionally with `,` digit grouping ("1,000").
/// Words f64 parsing also accepts ("inf", "NaN") are not numbers here.
fn is_numeric(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.starts_with(',') {
        return false;
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .is_ok_and(f64::is_finite)
}

/// Text must be non-blank and not parse as a number
pub fn check_text(field: Field, s: &str) -> ValidationResult<()> {
    if s.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if is_numeric(s) {
        return Err(ValidationError::Numeric {
            field,
            value: s.to_string(),
        });
    }
    Ok(())
}

/// Quantities must be finite and strictly positive
pub fn check_quantity(field: Field, value: f64) -> ValidationResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

pub fn check_portion_amount(amount: i32) -> ValidationResult<()> {
    if amount >= 1 {
        Ok(())
    } else {
        Err(ValidationError::PortionAmount(amount))
    }
}

pub fn check_category_kind(
    entity: &'static str,
    expected: CategoryKind,
    actual: CategoryKind,
) -> ValidationResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ValidationError::CategoryKind {
            entity,
            expected,
            actual,
        })
    }
}

pub fn is_valid_name(s: &str) -> bool {
    check_text(Field::Name, s).is_ok()
}

pub fn is_valid_note(s: &str) -> bool {
    check_text(Field::Note, s).is_ok()
}

pub fn is_valid_quantity(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub fn is_valid_portion_amount(amount: i32) -> bool {
    amount >= 1
}

/// Blank check used by the lenient setters
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
