//! Handlers for `/participants` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/participants` | Paging params plus optional `verified=true\|false` |
//! | `POST`  | `/participants` | Body: participant details tagged by `type`; 201 + `{"id"}` |
//! | `GET`   | `/participants/{id}` | 404 if not found |
//! | `PATCH` | `/participants/{id}` | Body: partial update tagged by `type` |
//! | `POST`  | `/participants/{id}/verification` | Sets `is_verified` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use registro_core::{
  listing::Page,
  participant::{Participant, ParticipantDetails, ParticipantUpdate},
  store::{ParticipantQuery, RegistryStore},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, params::paging};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub limit:        Option<u32>,
  pub sort:         Option<String>,
  pub timestamp_gt: Option<String>,
  pub timestamp_lt: Option<String>,
  pub verified:     Option<bool>,
}

/// `GET /participants[?limit=..][&sort=..][&verified=..][&timestamp_gt=..][&timestamp_lt=..]`
pub async fn list<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Participant, ParticipantQuery>>, ApiError> {
  let paging = paging(
    params.limit,
    params.sort.as_deref(),
    params.timestamp_gt.as_deref(),
    params.timestamp_lt.as_deref(),
  )?;
  let query = ParticipantQuery {
    limit:    paging.limit,
    sort:     paging.sort,
    verified: params.verified,
    window:   paging.window,
  };

  let page = state
    .store
    .list_participants(query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /participants`
pub async fn create<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Json(details): Json<ParticipantDetails>,
) -> Result<impl IntoResponse, ApiError> {
  let id = state
    .store
    .create_participant(details)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /participants/{id}`
pub async fn get_one<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Participant>, ApiError> {
  let participant = state
    .store
    .retrieve_participant(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(participant))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /participants/{id}`
pub async fn update<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<Uuid>,
  Json(update): Json<ParticipantUpdate>,
) -> Result<Json<Participant>, ApiError> {
  let participant = state
    .store
    .update_participant(id, update)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(participant))
}

/// `POST /participants/{id}/verification`
pub async fn verify<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Participant>, ApiError> {
  let participant = state
    .store
    .verify_participant(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(participant))
}
