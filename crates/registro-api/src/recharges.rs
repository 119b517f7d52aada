//! Handlers for recharge endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/accounts/{address}/recharges` | Opens a `WAITING` recharge; 201 + `{"id"}` |
//! | `GET`  | `/recharges` | Paging params plus comma-separated `status`, `recharge_ids`, `addresses`, `participant_ids` |
//! | `GET`  | `/recharges/{id}` | 404 if not found |
//! | `POST` | `/recharges/{id}/satisfy` | 409 unless `WAITING` |
//! | `POST` | `/recharges/{id}/reject` | 409 unless `WAITING` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use registro_core::{
  address::Address,
  listing::Page,
  recharge::RetrievedRecharge,
  store::{RechargeQuery, RegistryStore},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  params::{comma_set, paging},
};

// ─── Request ─────────────────────────────────────────────────────────────────

/// `POST /accounts/{address}/recharges`
pub async fn request<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(address): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let address = Address::parse(address)?;
  let id = state
    .store
    .request_recharge(address)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub limit:           Option<u32>,
  pub sort:            Option<String>,
  pub timestamp_gt:    Option<String>,
  pub timestamp_lt:    Option<String>,
  /// Comma-separated, e.g. `WAITING,SATISFIED`.
  pub status:          Option<String>,
  pub recharge_ids:    Option<String>,
  pub addresses:       Option<String>,
  pub participant_ids: Option<String>,
}

/// `GET /recharges`
pub async fn list<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<RetrievedRecharge, RechargeQuery>>, ApiError> {
  let paging = paging(
    params.limit,
    params.sort.as_deref(),
    params.timestamp_gt.as_deref(),
    params.timestamp_lt.as_deref(),
  )?;
  let query = RechargeQuery {
    limit:           paging.limit,
    sort:            paging.sort,
    window:          paging.window,
    statuses:        comma_set("status", params.status.as_deref())?,
    recharge_ids:    comma_set("recharge_ids", params.recharge_ids.as_deref())?,
    addresses:       comma_set("addresses", params.addresses.as_deref())?,
    participant_ids: comma_set("participant_ids", params.participant_ids.as_deref())?,
  };

  let page = state
    .store
    .list_recharges(query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /recharges/{id}`
pub async fn get_one<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RetrievedRecharge>, ApiError> {
  let recharge = state
    .store
    .retrieve_recharge(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(recharge))
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// `POST /recharges/{id}/satisfy`
pub async fn satisfy<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RetrievedRecharge>, ApiError> {
  let recharge = state
    .store
    .satisfy_recharge(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(recharge))
}

/// `POST /recharges/{id}/reject`
pub async fn reject<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RetrievedRecharge>, ApiError> {
  let recharge = state
    .store
    .reject_recharge(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(recharge))
}
