//! Handlers for `/accounts` and `/controllers` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/accounts` | Paging params |
//! | `POST`  | `/accounts` | Body: `{"address","participant_id","balance"?}`; 201 + account |
//! | `GET`   | `/accounts/{address}` | 404 if not found |
//! | `PATCH` | `/accounts/balances` | Body: `[{"address","balance"}]`; unknown addresses are skipped |
//! | `POST`  | `/controllers/{participant_id}/verifications/{address}` | 204 on success |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use registro_core::{
  account::{BalanceUpdate, NewAccount, RetrievedAccount},
  address::Address,
  listing::Page,
  store::{AccountQuery, RegistryStore},
};
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, params::PageParams};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /accounts[?limit=..][&sort=..][&timestamp_gt=..][&timestamp_lt=..]`
pub async fn list<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<RetrievedAccount, AccountQuery>>, ApiError> {
  let paging = params.paging()?;
  let query = AccountQuery {
    limit:  paging.limit,
    sort:   paging.sort,
    window: paging.window,
  };
  let page = state
    .store
    .list_accounts(query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /accounts`. The new account is limited by the configured
/// `balance_limit`.
pub async fn create<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Json(account): Json<NewAccount>,
) -> Result<impl IntoResponse, ApiError> {
  let address = account.address.clone();
  state
    .store
    .create_account(account, state.settings.balance_limit)
    .await
    .map_err(ApiError::from_store)?;
  let created = state
    .store
    .retrieve_account(address)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /accounts/{address}`
pub async fn get_one<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(address): Path<String>,
) -> Result<Json<RetrievedAccount>, ApiError> {
  let address = Address::parse(address)?;
  let account = state
    .store
    .retrieve_account(address)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(account))
}

// ─── Balances ────────────────────────────────────────────────────────────────

/// `PATCH /accounts/balances`
pub async fn update_balances<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Json(updates): Json<Vec<BalanceUpdate>>,
) -> Result<impl IntoResponse, ApiError> {
  let updated = state
    .store
    .bulk_update_balances(updates)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "updated": updated })))
}

// ─── Controllers ─────────────────────────────────────────────────────────────

/// `POST /controllers/{participant_id}/verifications/{address}`
pub async fn verify_controller<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path((participant_id, address)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
  let address = Address::parse(address)?;
  state
    .store
    .verify_controller(address, participant_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
