//! Prediction endpoints

use std::collections::HashMap;

use axum::extract::State;
use axum::{Form, Json};
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

/// Response for POST /predict
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub name: String,
    pub career: String,
    /// Percentage formatted to two decimals (e.g. "87.50%"), or null when
    /// the model does not report class scores.
    pub confidence: Option<String>,
}

/// POST /predict
///
/// Accepts a form-urlencoded submission (name, five subject scores, and an
/// interest), runs the inference pipeline, and returns the predicted career.
/// The submission and its prediction are recorded before this responds.
pub async fn predict(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> ApiResult<Json<PredictResponse>> {
    let prediction = state.pipeline.run(&fields).await?;

    Ok(Json(PredictResponse {
        name: prediction.name,
        career: prediction.career,
        confidence: prediction.confidence.map(|c| format!("{c:.2}%")),
    }))
}

/// Response for GET /interests
#[derive(Debug, Serialize)]
pub struct InterestsResponse {
    /// Training vocabulary in ascending order
    pub interests: Vec<String>,
}

/// GET /interests
///
/// Lists the interest labels the loaded model was trained on, so clients
/// can offer a picker instead of free text.
pub async fn list_interests(State(state): State<AppState>) -> Json<InterestsResponse> {
    Json(InterestsResponse {
        interests: state.pipeline.interest_vocabulary().to_vec(),
    })
}
