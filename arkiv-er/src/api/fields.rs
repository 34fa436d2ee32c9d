//! Field registry listing

use axum::{extract::State, Json};

use super::error::ApiResult;
use crate::metadata::{list_registered_fields, RegisteredField};
use crate::AppState;

/// GET /metadata-fields
pub async fn list_fields(State(state): State<AppState>) -> ApiResult<Json<Vec<RegisteredField>>> {
    Ok(Json(list_registered_fields(state.repo.as_ref()).await?))
}
