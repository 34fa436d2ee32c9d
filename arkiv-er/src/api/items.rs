//! Item resource endpoints
//!
//! Path ids are taken as text and parsed here so malformed ids surface as
//! `invalid_input` rather than a routing rejection.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::context::RequestContext;
use super::error::{ApiError, ApiResult};
use crate::metadata::{FieldValueInput, MetadataMutator};
use crate::pagination::{calculate_window, Window, WindowQuery};
use crate::projection::{DetailLevel, ItemRepresentation, ProjectionQuery, RepresentationProjector};
use crate::related::{CommentCount, RatingView, RelatedResourceLister};
use crate::AppState;
use arkiv_common::db::{Bitstream, Comment, MetadataEntry};
use arkiv_common::{parse_id, Result};

/// Field id given either as a JSON number or as text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldIdInput {
    Number(i64),
    Text(String),
}

impl FieldIdInput {
    pub fn resolve(&self) -> Result<i64> {
        match self {
            FieldIdInput::Number(id) => Ok(*id),
            FieldIdInput::Text(raw) => parse_id(raw, "field id"),
        }
    }
}

/// POST /items/:id/metadata body
#[derive(Debug, Clone, Deserialize)]
pub struct AddFieldRequest {
    pub id: FieldIdInput,
    pub value: String,
    #[serde(default, alias = "language")]
    pub lang: Option<String>,
}

/// Either a single `{"field": {...}}` object or a list of field values
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MetadataPayload {
    Many(Vec<FieldValueInput>),
    Single { field: FieldValueInput },
}

impl MetadataPayload {
    pub fn into_inputs(self) -> Vec<FieldValueInput> {
        match self {
            MetadataPayload::Many(inputs) => inputs,
            MetadataPayload::Single { field } => vec![field],
        }
    }
}

/// PUT /items/:id/metadata body
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceMetadataRequest {
    pub metadata: MetadataPayload,
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn listing_window(state: &AppState, query: WindowQuery) -> Window {
    calculate_window(
        query,
        state.config.default_page_limit,
        state.config.max_page_limit,
    )
}

/// GET /items/:id
pub async fn get_item(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(item_id): Path<String>,
    query: std::result::Result<Query<ProjectionQuery>, QueryRejection>,
) -> ApiResult<Json<ItemRepresentation>> {
    let item_id = parse_id(&item_id, "item id")?;
    let level = query_params(query)?.detail_level();

    let projector = RepresentationProjector::new(state.repo.as_ref(), level);
    Ok(Json(projector.item(ctx.principal, item_id).await?))
}

/// GET /items/:id/metadata
pub async fn get_metadata(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(item_id): Path<String>,
) -> ApiResult<Json<Vec<MetadataEntry>>> {
    let item_id = parse_id(&item_id, "item id")?;

    let projector = RepresentationProjector::new(state.repo.as_ref(), DetailLevel::IdOnly);
    Ok(Json(projector.metadata(ctx.principal, item_id).await?))
}

/// POST /items/:id/metadata
///
/// Responds 201 with the item id as a JSON string.
pub async fn add_metadata(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(item_id): Path<String>,
    payload: std::result::Result<Json<AddFieldRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<String>)> {
    let item_id = parse_id(&item_id, "item id")?;
    let request = json_body(payload)?;
    let field_id = request.id.resolve()?;

    let mutator = MetadataMutator::new(state.repo.as_ref());
    let id = mutator
        .add_field(ctx.principal, item_id, field_id, request.lang, request.value)
        .await?;

    Ok((StatusCode::CREATED, Json(id)))
}

/// PUT /items/:id/metadata
pub async fn replace_metadata(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(item_id): Path<String>,
    payload: std::result::Result<Json<ReplaceMetadataRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let item_id = parse_id(&item_id, "item id")?;
    let inputs = json_body(payload)?.metadata.into_inputs();

    let mutator = MetadataMutator::new(state.repo.as_ref());
    mutator.replace_all(ctx.principal, item_id, &inputs).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /items/:id/metadata/:eid
pub async fn remove_metadata(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((item_id, value_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let item_id = parse_id(&item_id, "item id")?;
    let value_id = parse_id(&value_id, "metadata value id")?;

    let mutator = MetadataMutator::new(state.repo.as_ref());
    mutator.remove_one(ctx.principal, item_id, value_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /items/:id/bitstreams
pub async fn list_bitstreams(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(item_id): Path<String>,
    query: std::result::Result<Query<WindowQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Bitstream>>> {
    let item_id = parse_id(&item_id, "item id")?;
    let window = listing_window(&state, query_params(query)?);

    let lister = RelatedResourceLister::new(state.repo.as_ref());
    Ok(Json(lister.bitstreams(ctx.principal, item_id, window).await?))
}

/// GET /items/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    query: std::result::Result<Query<WindowQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Comment>>> {
    let item_id = parse_id(&item_id, "item id")?;
    let window = listing_window(&state, query_params(query)?);

    let lister = RelatedResourceLister::new(state.repo.as_ref());
    Ok(Json(lister.top_comments(item_id, window).await?))
}

/// GET /items/:id/comments/count
pub async fn count_comments(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<CommentCount>> {
    let item_id = parse_id(&item_id, "item id")?;

    let lister = RelatedResourceLister::new(state.repo.as_ref());
    Ok(Json(lister.comment_count(item_id).await?))
}

/// GET /items/:id/rating
pub async fn get_rating(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(item_id): Path<String>,
) -> ApiResult<Json<RatingView>> {
    let item_id = parse_id(&item_id, "item id")?;

    let lister = RelatedResourceLister::new(state.repo.as_ref());
    Ok(Json(lister.rating(ctx.principal, item_id).await?))
}
