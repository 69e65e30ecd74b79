//! The inference pipeline: validate, resolve, encode, predict, record.

mod validate;
mod vector;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use pathwise_common::artifacts::ArtifactBundle;
use pathwise_common::db::{PredictionOutcome, RecordStore, StudentSubmission};
use pathwise_common::model::ModelCapability;

pub use validate::{validate, StudentInput, INTEREST_FIELD, NAME_FIELD, SCORE_FIELDS};
pub use vector::{build_feature_vector, FeatureVector};

/// Substituted when a request's interest is outside the training vocabulary.
const FALLBACK_INTEREST: &str = "Other";

/// Faults that can arise while serving one prediction.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// A required form field was absent or blank. Client fault.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// A score field did not parse as a finite number. Client fault.
    #[error("Field {field} must be numeric, got {value:?}")]
    NonNumericScore { field: &'static str, value: String },

    /// The persisted feature order names a column this build does not know.
    /// Deployment fault.
    #[error("Feature order names unknown column {column:?}")]
    FeatureOrderMismatch { column: String },

    /// The prediction was computed but could not be recorded.
    #[error("Failed to record prediction: {0}")]
    Persistence(#[source] pathwise_common::Error),

    /// The model or an encoder misbehaved mid-inference.
    #[error("Model invocation failed: {0}")]
    Model(#[source] pathwise_common::Error),
}

/// The outcome returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub name: String,
    pub career: String,
    /// Percentage in [0, 100], absent when the model cannot score classes.
    pub confidence: Option<f64>,
}

/// Owns the loaded artifact bundle and the record store, and runs requests
/// through the full inference sequence.
pub struct InferencePipeline {
    bundle: Arc<ArtifactBundle>,
    store: RecordStore,
}

impl InferencePipeline {
    pub fn new(bundle: Arc<ArtifactBundle>, store: RecordStore) -> Self {
        Self { bundle, store }
    }

    /// The interest labels the model was trained on, ascending.
    pub fn interest_vocabulary(&self) -> &[String] {
        self.bundle.interest_encoder.classes()
    }

    /// Map a raw interest onto the training vocabulary.
    ///
    /// Known labels pass through unchanged. Unknown ones substitute
    /// `"Other"` when the vocabulary has it, otherwise the first vocabulary
    /// entry. The vocabulary is never empty once a bundle has loaded, so
    /// this cannot fail.
    pub fn resolve_interest(&self, raw: &str) -> String {
        let encoder = &self.bundle.interest_encoder;
        if encoder.contains(raw) {
            return raw.to_string();
        }

        let substitute = if encoder.contains(FALLBACK_INTEREST) {
            FALLBACK_INTEREST
        } else {
            encoder.classes()[0].as_str()
        };
        warn!(interest = raw, substitute, "Unseen interest, substituting fallback");
        substitute.to_string()
    }

    /// Run the model over a prepared feature vector.
    ///
    /// Returns the decoded career label and, when the model reports class
    /// scores, the top score as a percentage.
    pub fn infer(&self, vector: &FeatureVector) -> Result<(String, Option<f64>), PredictError> {
        let (label, confidence) = match &self.bundle.model {
            ModelCapability::LabelOnly(model) => {
                let label = model.predict(vector.values()).map_err(PredictError::Model)?;
                (label, None)
            }
            ModelCapability::Probabilistic(model) => {
                let label = model.predict(vector.values()).map_err(PredictError::Model)?;
                let probabilities = model
                    .predict_probabilities(vector.values())
                    .map_err(PredictError::Model)?;
                let top = probabilities.iter().copied().fold(0.0f64, f64::max);
                (label, Some(top * 100.0))
            }
        };

        let career = self
            .bundle
            .target_encoder
            .decode(label)
            .map_err(PredictError::Model)?
            .to_string();
        Ok((career, confidence))
    }

    /// Serve one request end to end: validate the raw fields, resolve the
    /// interest, build the feature vector, predict, and append the
    /// student/prediction pair to the store.
    ///
    /// Nothing is recorded unless a prediction was actually produced, and
    /// the two rows land atomically or not at all.
    pub async fn run(&self, raw: &HashMap<String, String>) -> Result<Prediction, PredictError> {
        let input = validate(raw)?;

        let interest = self.resolve_interest(&input.interest);
        let encoded_interest = self
            .bundle
            .interest_encoder
            .encode(&interest)
            .map_err(PredictError::Model)?;

        let vector = build_feature_vector(&input, encoded_interest, &self.bundle.feature_order)?;
        let (career, confidence) = self.infer(&vector)?;

        let submission = StudentSubmission {
            name: input.name.clone(),
            english: input.scores[0],
            math: input.scores[1],
            science: input.scores[2],
            history: input.scores[3],
            geography: input.scores[4],
            interest,
        };
        let outcome = PredictionOutcome {
            career: career.clone(),
            confidence,
        };
        self.store
            .append(&submission, &outcome)
            .await
            .map_err(PredictError::Persistence)?;

        Ok(Prediction {
            name: input.name,
            career,
            confidence,
        })
    }
}
