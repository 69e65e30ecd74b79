//! Request validation.

use std::collections::HashMap;

use super::PredictError;

/// Form field carrying the student's name.
pub const NAME_FIELD: &str = "name";
/// Form field carrying the raw interest label.
pub const INTEREST_FIELD: &str = "Interest";
/// Score fields, in the order they land in `StudentInput::scores`.
pub const SCORE_FIELDS: [&str; 5] = ["English", "Math", "Science", "History", "Geography"];

/// A validated inference request.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentInput {
    pub name: String,
    /// Subject scores in `SCORE_FIELDS` order.
    pub scores: [f64; 5],
    /// Raw interest, before vocabulary fallback.
    pub interest: String,
}

/// Check presence and numeric form of every required field.
///
/// Blank-after-trim counts as missing. NaN and infinities are rejected as
/// non-numeric: a score is a plain real mark, and non-finite values would
/// poison the tree threshold comparisons downstream.
pub fn validate(raw: &HashMap<String, String>) -> Result<StudentInput, PredictError> {
    let name = required(raw, NAME_FIELD)?;

    let mut scores = [0.0f64; 5];
    for (slot, field) in scores.iter_mut().zip(SCORE_FIELDS) {
        let text = required(raw, field)?;
        let value: f64 = text.parse().map_err(|_| PredictError::NonNumericScore {
            field,
            value: text.clone(),
        })?;
        if !value.is_finite() {
            return Err(PredictError::NonNumericScore { field, value: text });
        }
        *slot = value;
    }

    let interest = required(raw, INTEREST_FIELD)?;

    Ok(StudentInput {
        name,
        scores,
        interest,
    })
}

fn required(raw: &HashMap<String, String>, field: &'static str) -> Result<String, PredictError> {
    match raw.get(field) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(PredictError::MissingField { field }),
    }
}
