//! Error types for `registro-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{address::Address, participant::ParticipantType};

#[derive(Debug, Error)]
pub enum Error {
  #[error("Participant not found. ID: {0}")]
  ParticipantNotFound(Uuid),

  #[error("Address not found: {0}")]
  AccountNotFound(Address),

  #[error(
    "Account controller not found. Address: {address}, participant ID: \
     {participant_id}"
  )]
  AccountControllerNotFound {
    address:        Address,
    participant_id: Uuid,
  },

  #[error("Recharge not found: {0}")]
  RechargeNotFound(Uuid),

  #[error("Customer not found. ID: {0}")]
  CustomerNotFound(Uuid),

  #[error("validation error: {0}")]
  Validation(String),

  /// A transition was requested from a state that does not allow it.
  #[error("{entity} {id} is {current}; this transition requires {expected}")]
  InvalidTransition {
    entity:   &'static str,
    id:       Uuid,
    current:  String,
    expected: String,
  },

  /// The participant row names a type whose detail columns are all null.
  #[error("participant {id} is typed {kind} but carries no {kind} details")]
  MissingDetails { id: Uuid, kind: ParticipantType },

  /// A controller or recharge exists without any status row.
  #[error("no status history recorded for {0}")]
  MissingStatus(Uuid),

  #[error("unknown discriminant: {0:?}")]
  UnknownDiscriminant(String),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse category of a failure, used by transport layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Validation,
  Conflict,
  InvalidTransition,
  Internal,
}

/// Implemented by every error type a [`crate::store::RegistryStore`] can
/// return.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::ParticipantNotFound(_)
      | Self::AccountNotFound(_)
      | Self::AccountControllerNotFound { .. }
      | Self::RechargeNotFound(_)
      | Self::CustomerNotFound(_) => ErrorKind::NotFound,
      Self::Validation(_) => ErrorKind::Validation,
      Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
      Self::MissingDetails { .. }
      | Self::MissingStatus(_)
      | Self::UnknownDiscriminant(_) => ErrorKind::Internal,
    }
  }
}
