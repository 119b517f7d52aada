//! Recharges: requests to credit an address, with a
//! `WAITING → SATISFIED | REJECTED` lifecycle.
//!
//! Like controllers, recharges keep an append-only status history. Only a
//! [`WaitingRecharge`] exposes `satisfy` and `reject`; it is obtained by
//! narrowing a [`RetrievedRecharge`] whose current status is `WAITING`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  address::Address,
  history::{StatusEntry, latest},
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RechargeStatus {
  Waiting,
  Satisfied,
  Rejected,
}

/// A recharge with its current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedRecharge {
  pub id:         Uuid,
  pub created_at: DateTime<Utc>,
  pub status:     RechargeStatus,
  pub address:    Address,
}

impl RetrievedRecharge {
  /// Rebuild a recharge from its row and its full status history.
  pub fn from_history(
    id: Uuid,
    created_at: DateTime<Utc>,
    address: Address,
    history: &[StatusEntry<RechargeStatus>],
  ) -> Result<Self> {
    let current = latest(history).ok_or(Error::MissingStatus(id))?;
    Ok(Self { id, created_at, status: current.status, address })
  }

  pub fn is_for_address(&self, address: &Address) -> bool { &self.address == address }

  /// Split into the typed view matching the current status.
  pub fn into_state(self) -> RechargeState {
    match self.status {
      RechargeStatus::Waiting => RechargeState::Waiting(WaitingRecharge(self)),
      RechargeStatus::Satisfied => RechargeState::Satisfied(SatisfiedRecharge(self)),
      RechargeStatus::Rejected => RechargeState::Rejected(RejectedRecharge(self)),
    }
  }

  /// Narrow to a [`WaitingRecharge`], failing with
  /// [`Error::InvalidTransition`] for terminal recharges.
  pub fn into_waiting(self) -> Result<WaitingRecharge> {
    match self.into_state() {
      RechargeState::Waiting(waiting) => Ok(waiting),
      RechargeState::Satisfied(SatisfiedRecharge(r))
      | RechargeState::Rejected(RejectedRecharge(r)) => Err(Error::InvalidTransition {
        entity:   "recharge",
        id:       r.id,
        current:  r.status.to_string(),
        expected: RechargeStatus::Waiting.to_string(),
      }),
    }
  }
}

/// The per-status views of a recharge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RechargeState {
  Waiting(WaitingRecharge),
  Satisfied(SatisfiedRecharge),
  Rejected(RejectedRecharge),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingRecharge(RetrievedRecharge);

impl WaitingRecharge {
  pub fn id(&self) -> Uuid { self.0.id }

  pub fn satisfy(self) -> SatisfiedRecharge {
    SatisfiedRecharge(RetrievedRecharge { status: RechargeStatus::Satisfied, ..self.0 })
  }

  pub fn reject(self) -> RejectedRecharge {
    RejectedRecharge(RetrievedRecharge { status: RechargeStatus::Rejected, ..self.0 })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatisfiedRecharge(RetrievedRecharge);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecharge(RetrievedRecharge);

/// Implemented by the terminal views; the store appends [`Self::status`] to
/// the recharge's history.
pub trait TerminalRecharge {
  fn recharge(&self) -> &RetrievedRecharge;

  fn into_recharge(self) -> RetrievedRecharge;

  fn id(&self) -> Uuid { self.recharge().id }

  fn status(&self) -> RechargeStatus { self.recharge().status }
}

impl TerminalRecharge for SatisfiedRecharge {
  fn recharge(&self) -> &RetrievedRecharge { &self.0 }

  fn into_recharge(self) -> RetrievedRecharge { self.0 }
}

impl TerminalRecharge for RejectedRecharge {
  fn recharge(&self) -> &RetrievedRecharge { &self.0 }

  fn into_recharge(self) -> RetrievedRecharge { self.0 }
}

#[cfg(test)]
mod tests {
  use chrono::TimeDelta;

  use super::*;

  fn address() -> Address {
    Address::parse("0x00000000000000000000000000000000000000aa").unwrap()
  }

  fn waiting() -> RetrievedRecharge {
    let now = Utc::now();
    RetrievedRecharge::from_history(
      Uuid::new_v4(),
      now,
      address(),
      &[StatusEntry::new(RechargeStatus::Waiting, now)],
    )
    .unwrap()
  }

  #[test]
  fn waiting_recharge_can_be_satisfied_or_rejected() {
    let recharge = waiting();
    let id = recharge.id;

    let satisfied = recharge.clone().into_waiting().unwrap().satisfy();
    assert_eq!(satisfied.id(), id);
    assert_eq!(satisfied.status(), RechargeStatus::Satisfied);

    let rejected = recharge.into_waiting().unwrap().reject();
    assert_eq!(rejected.status(), RechargeStatus::Rejected);
    assert!(rejected.into_recharge().is_for_address(&address()));
  }

  #[test]
  fn terminal_recharges_cannot_transition() {
    let done = waiting().into_waiting().unwrap().satisfy().into_recharge();
    let err = done.into_waiting().unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidTransition { entity: "recharge", ref current, .. } if current == "SATISFIED"
    ));
  }

  #[test]
  fn current_status_comes_from_the_latest_entry() {
    let t0 = Utc::now();
    let history = [
      StatusEntry::new(RechargeStatus::Rejected, t0 + TimeDelta::microseconds(5)),
      StatusEntry::new(RechargeStatus::Waiting, t0),
    ];
    let r =
      RetrievedRecharge::from_history(Uuid::new_v4(), t0, address(), &history).unwrap();
    assert!(matches!(r.into_state(), RechargeState::Rejected(_)));
  }

  #[test]
  fn status_strings() {
    assert_eq!(RechargeStatus::Satisfied.to_string(), "SATISFIED");
    assert_eq!("WAITING".parse::<RechargeStatus>().unwrap(), RechargeStatus::Waiting);
  }
}
