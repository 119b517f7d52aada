//! Error type for `registro-store-sqlite`.

use registro_core::{Classify, ErrorKind};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] registro_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(rusqlite::Error),

  /// A unique or foreign-key constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value could not be mapped back onto a domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self {
    match err.sqlite_error_code() {
      Some(ErrorCode::ConstraintViolation) => Self::Conflict(err.to_string()),
      _ => Self::Sqlite(err),
    }
  }
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Core(err) => err.kind(),
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::Database(_)
      | Self::Sqlite(_)
      | Self::Uuid(_)
      | Self::DateParse(_)
      | Self::Decode(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
