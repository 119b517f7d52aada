//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings in UTC with
//! microsecond precision. UUIDs are stored as hyphenated lowercase strings.
//! Enum discriminants are stored as their upper-case wire names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use registro_core::{
  address::Address,
  participant::{DetailColumns, Participant, ParticipantType},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Amounts ─────────────────────────────────────────────────────────────────

/// SQLite integers are signed; amounts above `i64::MAX` cannot be stored.
pub fn encode_amount(amount: u64) -> Result<i64> {
  i64::try_from(amount).map_err(|_| {
    registro_core::Error::validation(format!("amount {amount} is too large")).into()
  })
}

pub fn decode_amount(value: i64) -> Result<u64> {
  u64::try_from(value).map_err(|_| Error::Decode(format!("negative amount: {value}")))
}

// ─── Discriminants ───────────────────────────────────────────────────────────

/// Parse a stored enum discriminant.
pub fn decode_enum<T: FromStr>(s: String) -> Result<T> {
  s.parse()
    .map_err(|_| registro_core::Error::UnknownDiscriminant(s).into())
}

pub fn decode_address(s: String) -> Result<Address> {
  Address::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

// ─── Participant rows ────────────────────────────────────────────────────────

/// Columns of the participant wide join, in the order [`RawParticipant::read`]
/// expects them.
pub const PARTICIPANT_COLUMNS: &str = "
  p.id, p.created_at, p.is_verified, p.type,
  c.full_name, c.cuit,
  g.full_name, g.sector,
  n.first_name, n.last_name, i.type, i.value,
  a.full_name, a.education_level";

/// Outer joins bringing every detail table onto `participants p`. All but
/// the true type's columns come back null.
pub const PARTICIPANT_JOINS: &str = "
  LEFT JOIN companies c            ON c.participant_id = p.id
  LEFT JOIN government_organisms g ON g.participant_id = p.id
  LEFT JOIN natural_persons n      ON n.participant_id = p.id
  LEFT JOIN identifications i      ON i.person_id = n.id
  LEFT JOIN academics a            ON a.participant_id = p.id";

/// Number of columns in [`PARTICIPANT_COLUMNS`].
pub const PARTICIPANT_WIDTH: usize = 14;

/// Raw values read directly from one row of the participant wide join.
pub struct RawParticipant {
  pub id:          String,
  pub created_at:  String,
  pub is_verified: bool,
  pub kind:        String,
  pub columns:     DetailColumns,
}

impl RawParticipant {
  /// Read the participant columns starting at column `offset`.
  pub fn read(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    let col = |i: usize| offset + i;
    Ok(Self {
      id:          row.get(col(0))?,
      created_at:  row.get(col(1))?,
      is_verified: row.get(col(2))?,
      kind:        row.get(col(3))?,
      columns:     DetailColumns {
        company_full_name:    row.get(col(4))?,
        company_cuit:         row.get(col(5))?,
        government_full_name: row.get(col(6))?,
        government_sector:    row.get(col(7))?,
        first_name:           row.get(col(8))?,
        last_name:            row.get(col(9))?,
        identification_type:  row.get(col(10))?,
        identification_value: row.get(col(11))?,
        academic_full_name:   row.get(col(12))?,
        education_level:      row.get(col(13))?,
      },
    })
  }

  pub fn into_participant(self) -> Result<Participant> {
    let kind: ParticipantType = decode_enum(self.kind)?;
    Ok(Participant::from_columns(
      decode_uuid(&self.id)?,
      decode_dt(&self.created_at)?,
      self.is_verified,
      kind,
      self.columns,
    )?)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let whole = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let fractional = Utc.timestamp_opt(1_700_000_000, 120_000).unwrap();
    assert_eq!(encode_dt(whole), "2023-11-14T22:13:20.000000Z");
    assert_eq!(encode_dt(fractional), "2023-11-14T22:13:20.000120Z");
    assert!(encode_dt(whole) < encode_dt(fractional));
    assert_eq!(decode_dt(&encode_dt(fractional)).unwrap(), fractional);
  }

  #[test]
  fn amounts_must_fit_sqlite_integers() {
    assert_eq!(encode_amount(5).unwrap(), 5);
    assert!(encode_amount(u64::MAX).is_err());
    assert!(decode_amount(-1).is_err());
  }

  #[test]
  fn unknown_discriminants_are_reported() {
    let err = decode_enum::<ParticipantType>("ROBOT".into()).unwrap_err();
    assert!(matches!(
      err,
      Error::Core(registro_core::Error::UnknownDiscriminant(ref s)) if s == "ROBOT"
    ));
  }
}
