//! Reading and appending rows of the append-only status tables.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use registro_core::history::StatusEntry;
use rusqlite::{Transaction, params};
use uuid::Uuid;

use crate::{
  Result,
  clock::Clock,
  encode::{decode_dt, decode_enum, encode_dt, encode_uuid},
};

/// A status table and the column referencing its parent.
#[derive(Debug, Clone, Copy)]
pub struct StatusTable {
  pub table: &'static str,
  pub fk:    &'static str,
}

pub const CONTROLLER_STATUSES: StatusTable =
  StatusTable { table: "account_controller_statuses", fk: "controller_id" };

pub const RECHARGE_STATUSES: StatusTable =
  StatusTable { table: "recharge_statuses", fk: "recharge_id" };

impl StatusTable {
  /// Every status recorded for `parent`, oldest first.
  pub fn history<S: FromStr>(
    self,
    tx: &Transaction<'_>,
    parent: Uuid,
  ) -> Result<Vec<StatusEntry<S>>> {
    let sql = format!(
      "SELECT status, created_at FROM {} WHERE {} = ?1 ORDER BY created_at",
      self.table, self.fk
    );
    let mut stmt = tx.prepare(&sql)?;
    let rows = stmt
      .query_map(params![encode_uuid(parent)], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    rows
      .into_iter()
      .map(|(status, at)| Ok(StatusEntry::new(decode_enum(status)?, decode_dt(&at)?)))
      .collect()
  }

  /// Append `status` to the history of `parent`.
  pub fn append(
    self,
    tx: &Transaction<'_>,
    clock: &Clock,
    parent: Uuid,
    status: &'static str,
  ) -> Result<DateTime<Utc>> {
    let at = clock.now();
    let sql = format!(
      "INSERT INTO {} (id, {}, status, created_at) VALUES (?1, ?2, ?3, ?4)",
      self.table, self.fk
    );
    tx.execute(
      &sql,
      params![encode_uuid(Uuid::new_v4()), encode_uuid(parent), status, encode_dt(at)],
    )?;
    Ok(at)
  }
}
