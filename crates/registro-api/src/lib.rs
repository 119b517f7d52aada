//! JSON REST API for the Registro participant registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`registro_core::store::RegistryStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", registro_api::api_router(store.clone(), Settings::default()))
//! ```

pub mod accounts;
pub mod customers;
pub mod error;
pub mod params;
pub mod participants;
pub mod recharges;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use registro_core::store::RegistryStore;
use serde::Deserialize;

pub use error::ApiError;

/// Operator settings the handlers inject into store calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Settings {
  /// Balance limit written with every new account.
  #[serde(default = "Settings::default_balance_limit")]
  pub balance_limit: u64,
}

impl Settings {
  pub const DEFAULT_BALANCE_LIMIT: u64 = 100_000_000;

  fn default_balance_limit() -> u64 { Self::DEFAULT_BALANCE_LIMIT }
}

impl Default for Settings {
  fn default() -> Self { Self { balance_limit: Self::DEFAULT_BALANCE_LIMIT } }
}

/// Shared handler state.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub settings: Settings,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, settings: Settings) -> Router<()>
where
  S: RegistryStore + 'static,
{
  let state = Arc::new(ApiState { store, settings });
  Router::new()
    // Participants
    .route(
      "/participants",
      get(participants::list::<S>).post(participants::create::<S>),
    )
    .route(
      "/participants/{id}",
      get(participants::get_one::<S>).patch(participants::update::<S>),
    )
    .route("/participants/{id}/verification", post(participants::verify::<S>))
    // Accounts and controllers
    .route("/accounts", get(accounts::list::<S>).post(accounts::create::<S>))
    .route("/accounts/balances", patch(accounts::update_balances::<S>))
    .route("/accounts/{address}", get(accounts::get_one::<S>))
    .route("/accounts/{address}/recharges", post(recharges::request::<S>))
    .route(
      "/controllers/{participant_id}/verifications/{address}",
      post(accounts::verify_controller::<S>),
    )
    // Recharges
    .route("/recharges", get(recharges::list::<S>))
    .route("/recharges/{id}", get(recharges::get_one::<S>))
    .route("/recharges/{id}/satisfy", post(recharges::satisfy::<S>))
    .route("/recharges/{id}/reject", post(recharges::reject::<S>))
    // Customers
    .route("/customers", get(customers::list::<S>).post(customers::create::<S>))
    .route(
      "/customers/{id}",
      get(customers::get_one::<S>).patch(customers::update::<S>),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests;
