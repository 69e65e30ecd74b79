//! Feature-vector assembly.

use pathwise_common::artifacts::FeatureOrder;

use super::validate::{StudentInput, INTEREST_FIELD, SCORE_FIELDS};
use super::PredictError;

/// A numeric row laid out in the model's training column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Arrange the validated input into the persisted column order.
///
/// The order file is the single source of truth for layout: scores and the
/// encoded interest are placed wherever it says, and a column it names that
/// this build does not know is a deployment fault, not a client fault.
pub fn build_feature_vector(
    input: &StudentInput,
    encoded_interest: u32,
    order: &FeatureOrder,
) -> Result<FeatureVector, PredictError> {
    let mut values = Vec::with_capacity(order.len());
    for column in order.columns() {
        if column.as_str() == INTEREST_FIELD {
            values.push(f64::from(encoded_interest));
        } else if let Some(idx) = SCORE_FIELDS.iter().position(|f| *f == column.as_str()) {
            values.push(input.scores[idx]);
        } else {
            return Err(PredictError::FeatureOrderMismatch {
                column: column.clone(),
            });
        }
    }
    Ok(FeatureVector { values })
}
