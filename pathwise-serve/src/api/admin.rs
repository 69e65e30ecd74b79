//! Administrative record listing

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use pathwise_common::db::PredictionListing;

use crate::error::ApiResult;
use crate::AppState;

/// Response for GET /admin/records
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    /// Every recorded submission joined with its prediction, newest first
    pub records: Vec<PredictionListing>,
}

/// GET /admin/records
///
/// Full history of submissions and their predictions, newest first.
pub async fn list_records(State(state): State<AppState>) -> ApiResult<Json<RecordsResponse>> {
    let records = state.store.list_all().await?;
    Ok(Json(RecordsResponse { records }))
}
