//! Recharges and their status histories.

use std::sync::LazyLock;

use registro_core::{
  address::Address,
  listing::Page,
  recharge::{RechargeStatus, RetrievedRecharge, TerminalRecharge, WaitingRecharge},
  store::RechargeQuery,
};
use rusqlite::{
  OptionalExtension as _, Row, Transaction, params, params_from_iter, types::Value,
};
use uuid::Uuid;

use crate::{
  Result, accounts,
  clock::Clock,
  encode::{decode_address, decode_dt, decode_enum, decode_uuid, encode_dt, encode_uuid},
  filter::{Filter, latest_status_join, placeholders},
  status::RECHARGE_STATUSES,
};

/// Recharge ⨝ address ⨝ newest status row.
static RECHARGE_SELECT: LazyLock<String> = LazyLock::new(|| {
  format!(
    "SELECT r.id, r.created_at, e.public_key, s.status
     FROM recharges r
     JOIN ethereum_accounts e ON e.id = r.address_id
     {}",
    latest_status_join("recharge_statuses", "s", "recharge_id", "r"),
  )
});

struct RawRecharge {
  id:         String,
  created_at: String,
  address:    String,
  status:     String,
}

impl RawRecharge {
  fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      created_at: row.get(1)?,
      address:    row.get(2)?,
      status:     row.get(3)?,
    })
  }

  fn into_recharge(self) -> Result<RetrievedRecharge> {
    Ok(RetrievedRecharge {
      id:         decode_uuid(&self.id)?,
      created_at: decode_dt(&self.created_at)?,
      status:     decode_enum(self.status)?,
      address:    decode_address(self.address)?,
    })
  }
}

/// Open a `WAITING` recharge on an existing address.
pub fn insert(tx: &Transaction<'_>, clock: &Clock, address: &Address) -> Result<Uuid> {
  let account_id = accounts::require(tx, address)?;

  let id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO recharges (id, address_id, created_at) VALUES (?1, ?2, ?3)",
    params![encode_uuid(id), account_id, encode_dt(clock.now())],
  )?;
  RECHARGE_STATUSES.append(tx, clock, id, RechargeStatus::Waiting.into())?;
  Ok(id)
}

pub fn fetch(tx: &Transaction<'_>, id: Uuid) -> Result<RetrievedRecharge> {
  let sql = format!("{} WHERE r.id = ?1", *RECHARGE_SELECT);
  tx.query_row(&sql, params![encode_uuid(id)], RawRecharge::read)
    .optional()?
    .ok_or(registro_core::Error::RechargeNotFound(id))?
    .into_recharge()
}

/// Load the recharge with its full history, narrow it to a
/// [`WaitingRecharge`] and append the status produced by `apply`.
pub fn transition<T: TerminalRecharge>(
  tx: &Transaction<'_>,
  clock: &Clock,
  id: Uuid,
  apply: impl FnOnce(WaitingRecharge) -> T,
) -> Result<RetrievedRecharge> {
  let (created_at, address): (String, String) = tx
    .query_row(
      "SELECT r.created_at, e.public_key
       FROM recharges r
       JOIN ethereum_accounts e ON e.id = r.address_id
       WHERE r.id = ?1",
      params![encode_uuid(id)],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()?
    .ok_or(registro_core::Error::RechargeNotFound(id))?;

  let history = RECHARGE_STATUSES.history::<RechargeStatus>(tx, id)?;
  let current = RetrievedRecharge::from_history(
    id,
    decode_dt(&created_at)?,
    decode_address(address)?,
    &history,
  )?;

  let done = apply(current.into_waiting()?);
  RECHARGE_STATUSES.append(tx, clock, done.id(), done.status().into())?;
  Ok(done.into_recharge())
}

pub fn list(
  tx: &Transaction<'_>,
  query: &RechargeQuery,
) -> Result<Page<RetrievedRecharge, RechargeQuery>> {
  let mut filter = Filter::default();
  filter.any_of(
    "s.status",
    query.statuses.iter().map(|s| <&'static str>::from(*s).to_owned()),
  );
  filter.any_of("r.id", query.recharge_ids.iter().copied().map(encode_uuid));
  filter.any_of(
    "e.public_key",
    query.addresses.iter().map(|a| a.as_str().to_owned()),
  );
  if !query.participant_ids.is_empty() {
    // EXISTS keeps one row per recharge however many controllers match.
    let ids: Vec<Value> = query
      .participant_ids
      .iter()
      .map(|id| Value::Text(encode_uuid(*id)))
      .collect();
    filter.push(
      format!(
        "EXISTS (SELECT 1 FROM account_controllers ac
                 WHERE ac.address_id = r.address_id AND ac.participant_id IN ({}))",
        placeholders(ids.len())
      ),
      ids,
    );
  }
  filter.window("r.created_at", query.window);

  let (sql, values) = filter.finish(&RECHARGE_SELECT, "r.created_at", query.sort, query.limit);
  let mut stmt = tx.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(values), RawRecharge::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let results = raws
    .into_iter()
    .map(RawRecharge::into_recharge)
    .collect::<Result<Vec<_>>>()?;

  Ok(Page::new(results, query, |r| r.created_at))
}
