//! Address records, their balance limits and the participants that control
//! them.
//!
//! Each controller carries its own append-only verification history. A
//! controller can only be verified through an [`UnverifiedController`], which
//! is obtained by checking the current status first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  address::Address,
  history::{StatusEntry, latest},
  participant::Participant,
};

// ─── Controller status ───────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ControllerStatus {
  Unverified,
  Verified,
  /// Representable and readable; no operation currently writes it.
  ToReverified,
  /// Representable and readable; no operation currently writes it.
  Rejected,
}

// ─── Creation ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::RegistryStore::create_account`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
  pub address:        Address,
  /// The participant that becomes the first (unverified) controller.
  pub participant_id: Uuid,
  #[serde(default)]
  pub balance:        u64,
}

impl NewAccount {
  pub fn new(address: Address, participant_id: Uuid) -> Self {
    Self { address, participant_id, balance: 0 }
  }

  /// The starting balance may not exceed the configured limit.
  pub fn check_limit(&self, balance_limit: u64) -> Result<()> {
    if self.balance > balance_limit {
      return Err(Error::validation(format!(
        "starting balance {} of {} exceeds the balance limit {balance_limit}",
        self.balance, self.address
      )));
    }
    Ok(())
  }
}

/// One `(address, balance)` pair of a bulk balance overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceUpdate {
  pub address: Address,
  pub balance: u64,
}

// ─── Retrieval ───────────────────────────────────────────────────────────────

/// A participant bound to an address, with its current verification status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountController {
  pub id:          Uuid,
  pub status:      ControllerStatus,
  pub participant: Participant,
}

impl AccountController {
  pub fn is_verified(&self) -> bool { self.status == ControllerStatus::Verified }
}

/// An address record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedAccount {
  pub address:       Address,
  pub created_at:    DateTime<Utc>,
  pub balance:       u64,
  pub balance_limit: u64,
  pub controllers:   Vec<AccountController>,
}

impl RetrievedAccount {
  pub fn controller(&self, participant_id: Uuid) -> Option<&AccountController> {
    self
      .controllers
      .iter()
      .find(|c| c.participant.is_identified_as(participant_id))
  }

  pub fn has_controller_identified_as(&self, participant_id: Uuid) -> bool {
    self.controller(participant_id).is_some()
  }

  /// Whether the controller for `participant_id` is verified. Fails if the
  /// participant does not control this address.
  pub fn controller_identified_as_is_verified(
    &self,
    participant_id: Uuid,
  ) -> Result<bool> {
    self
      .controller(participant_id)
      .map(AccountController::is_verified)
      .ok_or_else(|| Error::AccountControllerNotFound {
        address: self.address.clone(),
        participant_id,
      })
  }

  pub fn controllers_count_is(&self, count: usize) -> bool {
    self.controllers.len() == count
  }

  pub fn balance_limit_is(&self, amount: u64) -> bool { self.balance_limit == amount }

  pub fn has_balance(&self, balance: u64) -> bool { self.balance == balance }
}

// ─── Controller state views ──────────────────────────────────────────────────

/// A controller identified by `(address, participant)` together with its
/// current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRecord {
  pub id:             Uuid,
  pub address:        Address,
  pub participant_id: Uuid,
  pub status:         ControllerStatus,
}

impl ControllerRecord {
  /// Resolve the current status from the controller's full history.
  pub fn from_history(
    id: Uuid,
    address: Address,
    participant_id: Uuid,
    history: &[StatusEntry<ControllerStatus>],
  ) -> Result<Self> {
    let current = latest(history).ok_or(Error::MissingStatus(id))?;
    Ok(Self { id, address, participant_id, status: current.status })
  }

  /// Narrow to the only state from which verification is allowed.
  pub fn into_unverified(self) -> Result<UnverifiedController> {
    if self.status != ControllerStatus::Unverified {
      return Err(Error::InvalidTransition {
        entity:   "account controller",
        id:       self.id,
        current:  self.status.to_string(),
        expected: ControllerStatus::Unverified.to_string(),
      });
    }
    Ok(UnverifiedController {
      id:             self.id,
      address:        self.address,
      participant_id: self.participant_id,
    })
  }
}

/// A controller whose current status is known to be `UNVERIFIED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedController {
  id:             Uuid,
  address:        Address,
  participant_id: Uuid,
}

impl UnverifiedController {
  pub fn id(&self) -> Uuid { self.id }

  pub fn verify(self) -> VerifiedController {
    VerifiedController {
      id:             self.id,
      address:        self.address,
      participant_id: self.participant_id,
    }
  }
}

/// The result of [`UnverifiedController::verify`]; the store appends its
/// status to the controller's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedController {
  id:             Uuid,
  address:        Address,
  participant_id: Uuid,
}

impl VerifiedController {
  pub fn id(&self) -> Uuid { self.id }

  pub fn address(&self) -> &Address { &self.address }

  pub fn participant_id(&self) -> Uuid { self.participant_id }

  pub fn status(&self) -> ControllerStatus { ControllerStatus::Verified }
}

#[cfg(test)]
mod tests {
  use chrono::TimeDelta;

  use super::*;
  use crate::participant::{Company, ParticipantDetails};

  fn address() -> Address {
    Address::parse("0x42D429eaB483e88aBa5A80aF056dEC3610886101").unwrap()
  }

  fn account(controller_status: ControllerStatus) -> (RetrievedAccount, Uuid) {
    let participant = Participant {
      id:          Uuid::new_v4(),
      created_at:  Utc::now(),
      is_verified: false,
      details:     ParticipantDetails::Company(Company {
        full_name: "Acme".into(),
        cuit:      "30-1-1".into(),
      }),
    };
    let pid = participant.id;
    let account = RetrievedAccount {
      address:       address(),
      created_at:    Utc::now(),
      balance:       10,
      balance_limit: 100,
      controllers:   vec![AccountController {
        id: Uuid::new_v4(),
        status: controller_status,
        participant,
      }],
    };
    (account, pid)
  }

  #[test]
  fn account_predicates() {
    let (account, pid) = account(ControllerStatus::Unverified);
    assert!(account.controllers_count_is(1));
    assert!(account.has_controller_identified_as(pid));
    assert!(!account.controller_identified_as_is_verified(pid).unwrap());
    assert!(account.has_balance(10));
    assert!(account.balance_limit_is(100));
  }

  #[test]
  fn verified_query_requires_a_controller() {
    let (account, _) = account(ControllerStatus::Verified);
    let stranger = Uuid::new_v4();
    let err = account.controller_identified_as_is_verified(stranger).unwrap_err();
    assert!(matches!(
      err,
      Error::AccountControllerNotFound { participant_id, .. } if participant_id == stranger
    ));
  }

  #[test]
  fn only_unverified_controllers_can_be_verified() {
    let t0 = Utc::now();
    let id = Uuid::new_v4();
    let pid = Uuid::new_v4();

    let history = vec![StatusEntry::new(ControllerStatus::Unverified, t0)];
    let record = ControllerRecord::from_history(id, address(), pid, &history).unwrap();
    let verified = record.into_unverified().unwrap().verify();
    assert_eq!(verified.id(), id);
    assert_eq!(verified.status(), ControllerStatus::Verified);

    let history = vec![
      StatusEntry::new(ControllerStatus::Unverified, t0),
      StatusEntry::new(ControllerStatus::Verified, t0 + TimeDelta::microseconds(1)),
    ];
    let record = ControllerRecord::from_history(id, address(), pid, &history).unwrap();
    assert!(matches!(
      record.into_unverified(),
      Err(Error::InvalidTransition { current, .. }) if current == "VERIFIED"
    ));
  }

  #[test]
  fn empty_history_is_an_integrity_error() {
    let id = Uuid::new_v4();
    let err =
      ControllerRecord::from_history(id, address(), Uuid::new_v4(), &[]).unwrap_err();
    assert!(matches!(err, Error::MissingStatus(got) if got == id));
  }

  #[test]
  fn starting_balance_must_fit_the_limit() {
    let mut new = NewAccount::new(address(), Uuid::new_v4());
    new.balance = 101;
    assert!(new.check_limit(100).is_err());
    new.balance = 100;
    assert!(new.check_limit(100).is_ok());
  }
}
