//! The `RegistryStore` trait and the listing queries it accepts.
//!
//! The trait is implemented by storage backends (e.g.
//! `registro-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::{collections::BTreeSet, future::Future};

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Classify,
  account::{BalanceUpdate, NewAccount, RetrievedAccount},
  address::Address,
  customer::{Customer, RetrievedCustomer},
  listing::{ListLimit, Listing, Page, SortOrder, TimeWindow, comma_separated},
  participant::{Participant, ParticipantDetails, ParticipantUpdate},
  recharge::{RechargeStatus, RetrievedRecharge},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`RegistryStore::list_participants`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantQuery {
  pub limit:    ListLimit,
  pub sort:     SortOrder,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub verified: Option<bool>,
  #[serde(flatten)]
  pub window:   TimeWindow,
}

/// Parameters for [`RegistryStore::list_accounts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountQuery {
  pub limit:  ListLimit,
  pub sort:   SortOrder,
  #[serde(flatten)]
  pub window: TimeWindow,
}

/// Parameters for [`RegistryStore::list_recharges`]. Every non-empty set
/// restricts the listing; the restrictions are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RechargeQuery {
  pub limit:           ListLimit,
  pub sort:            SortOrder,
  #[serde(flatten)]
  pub window:          TimeWindow,
  /// Matched against the *current* status only.
  #[serde(
    rename = "status",
    serialize_with = "comma_separated",
    skip_serializing_if = "BTreeSet::is_empty"
  )]
  pub statuses:        BTreeSet<RechargeStatus>,
  #[serde(serialize_with = "comma_separated", skip_serializing_if = "BTreeSet::is_empty")]
  pub recharge_ids:    BTreeSet<Uuid>,
  #[serde(serialize_with = "comma_separated", skip_serializing_if = "BTreeSet::is_empty")]
  pub addresses:       BTreeSet<Address>,
  /// Recharges on addresses controlled by any of these participants.
  #[serde(serialize_with = "comma_separated", skip_serializing_if = "BTreeSet::is_empty")]
  pub participant_ids: BTreeSet<Uuid>,
}

/// Parameters for [`RegistryStore::list_customers`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerQuery {
  pub limit:  ListLimit,
  pub sort:   SortOrder,
  #[serde(flatten)]
  pub window: TimeWindow,
}

macro_rules! impl_listing {
  ($($query:ty),* $(,)?) => {$(
    impl Listing for $query {
      fn limit(&self) -> ListLimit { self.limit }

      fn sort(&self) -> SortOrder { self.sort }

      fn window(&self) -> TimeWindow { self.window }

      fn with_window(self, window: TimeWindow) -> Self { Self { window, ..self } }
    }
  )*};
}

impl_listing!(ParticipantQuery, AccountQuery, RechargeQuery, CustomerQuery);

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a registry storage backend.
///
/// Every method is one atomic unit of work: either all of its writes commit
/// or none do. Status histories are append-only; transitions add a row and
/// never rewrite an earlier one.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Participants ──────────────────────────────────────────────────────

  /// Persist a new, unverified participant and return its id.
  fn create_participant(
    &self,
    details: ParticipantDetails,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Fails with `ParticipantNotFound` for unknown ids.
  fn retrieve_participant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  /// Apply a partial update. Omitted fields keep their stored values; an
  /// update for a different participant type is a validation error.
  fn update_participant(
    &self,
    id: Uuid,
    update: ParticipantUpdate,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  /// Mark a participant as verified and record when.
  fn verify_participant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  fn list_participants(
    &self,
    query: ParticipantQuery,
  ) -> impl Future<Output = Result<Page<Participant, ParticipantQuery>, Self::Error>>
  + Send
  + '_;

  // ── Accounts and controllers ──────────────────────────────────────────

  /// Create an address record with its balance limit and a single
  /// `UNVERIFIED` controller for `account.participant_id`.
  ///
  /// An existing address is a conflict.
  fn create_account(
    &self,
    account: NewAccount,
    balance_limit: u64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fails with `AccountNotFound` for unknown addresses.
  fn retrieve_account(
    &self,
    address: Address,
  ) -> impl Future<Output = Result<RetrievedAccount, Self::Error>> + Send + '_;

  fn list_accounts(
    &self,
    query: AccountQuery,
  ) -> impl Future<Output = Result<Page<RetrievedAccount, AccountQuery>, Self::Error>>
  + Send
  + '_;

  /// Append a `VERIFIED` status to the controller binding `participant_id`
  /// to `address`.
  ///
  /// Fails with `AccountControllerNotFound` when there is no such
  /// controller, and with `InvalidTransition` when its current status is
  /// not `UNVERIFIED`.
  fn verify_controller(
    &self,
    address: Address,
    participant_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite the balance of every listed address that exists. Unknown
  /// addresses are skipped. Returns how many records were updated.
  fn bulk_update_balances(
    &self,
    updates: Vec<BalanceUpdate>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Recharges ─────────────────────────────────────────────────────────

  /// Open a `WAITING` recharge on an existing address.
  fn request_recharge(
    &self,
    address: Address,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Fails with `RechargeNotFound` for unknown ids.
  fn retrieve_recharge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<RetrievedRecharge, Self::Error>> + Send + '_;

  /// `WAITING → SATISFIED`; any other current status is an
  /// `InvalidTransition`.
  fn satisfy_recharge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<RetrievedRecharge, Self::Error>> + Send + '_;

  /// `WAITING → REJECTED`; any other current status is an
  /// `InvalidTransition`.
  fn reject_recharge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<RetrievedRecharge, Self::Error>> + Send + '_;

  fn list_recharges(
    &self,
    query: RechargeQuery,
  ) -> impl Future<Output = Result<Page<RetrievedRecharge, RechargeQuery>, Self::Error>>
  + Send
  + '_;

  // ── Customers ─────────────────────────────────────────────────────────

  fn create_customer(
    &self,
    customer: Customer,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  fn retrieve_customer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<RetrievedCustomer, Self::Error>> + Send + '_;

  fn update_customer(
    &self,
    id: Uuid,
    customer: Customer,
  ) -> impl Future<Output = Result<RetrievedCustomer, Self::Error>> + Send + '_;

  fn list_customers(
    &self,
    query: CustomerQuery,
  ) -> impl Future<Output = Result<Page<RetrievedCustomer, CustomerQuery>, Self::Error>>
  + Send
  + '_;
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  #[test]
  fn next_query_serialises_like_request_parameters() {
    let mut query = RechargeQuery {
      sort: SortOrder::Asc,
      ..Default::default()
    };
    query.statuses.insert(RechargeStatus::Waiting);
    query.statuses.insert(RechargeStatus::Satisfied);
    query.window.gt = Some(Utc.timestamp_opt(0, 0).unwrap());

    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(json["limit"], 10);
    assert_eq!(json["sort"], "asc");
    assert_eq!(json["status"], "WAITING,SATISFIED");
    assert_eq!(json["timestamp_gt"], "1970-01-01T00:00:00Z");
    assert!(json.get("timestamp_lt").is_none());
    assert!(json.get("addresses").is_none());
  }
}
