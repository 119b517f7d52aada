//! Handlers for `/customers` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use registro_core::{
  customer::{Customer, RetrievedCustomer},
  listing::Page,
  store::{CustomerQuery, RegistryStore},
};
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, params::PageParams};

/// `GET /customers`
pub async fn list<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<RetrievedCustomer, CustomerQuery>>, ApiError> {
  let paging = params.paging()?;
  let query = CustomerQuery {
    limit:  paging.limit,
    sort:   paging.sort,
    window: paging.window,
  };
  let page = state
    .store
    .list_customers(query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page))
}

/// `POST /customers`, body: `{"name":"..."}`
pub async fn create<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Json(customer): Json<Customer>,
) -> Result<impl IntoResponse, ApiError> {
  let id = state
    .store
    .create_customer(customer)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `GET /customers/{id}`
pub async fn get_one<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RetrievedCustomer>, ApiError> {
  let customer = state
    .store
    .retrieve_customer(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(customer))
}

/// `PATCH /customers/{id}`, body: `{"name":"..."}`
pub async fn update<S: RegistryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<Uuid>,
  Json(customer): Json<Customer>,
) -> Result<Json<RetrievedCustomer>, ApiError> {
  let customer = state
    .store
    .update_customer(id, customer)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(customer))
}
