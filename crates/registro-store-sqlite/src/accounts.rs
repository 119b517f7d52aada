//! Address records, balance limits and account controllers.

use registro_core::{
  account::{
    AccountController, BalanceUpdate, ControllerRecord, ControllerStatus, NewAccount,
    RetrievedAccount,
  },
  address::Address,
  listing::Page,
  store::AccountQuery,
};
use rusqlite::{OptionalExtension as _, Row, Transaction, params, params_from_iter};
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::Clock,
  encode::{
    PARTICIPANT_COLUMNS, PARTICIPANT_JOINS, RawParticipant, decode_address, decode_amount,
    decode_dt, decode_enum, decode_uuid, encode_amount, encode_dt, encode_uuid,
  },
  filter::{Filter, latest_status_join},
  participants,
  status::CONTROLLER_STATUSES,
};

const ACCOUNT_SELECT: &str = "
  SELECT e.id, e.public_key, e.created_at, e.balance, l.amount
  FROM ethereum_accounts e
  JOIN balance_limits l ON l.address_id = e.id";

/// Raw values of one `ethereum_accounts ⨝ balance_limits` row.
struct RawAccount {
  id:            String,
  public_key:    String,
  created_at:    String,
  balance:       i64,
  balance_limit: i64,
}

impl RawAccount {
  fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      public_key:    row.get(1)?,
      created_at:    row.get(2)?,
      balance:       row.get(3)?,
      balance_limit: row.get(4)?,
    })
  }

  fn into_account(self, tx: &Transaction<'_>) -> Result<RetrievedAccount> {
    let controllers = controllers(tx, &self.id)?;
    Ok(RetrievedAccount {
      address: decode_address(self.public_key)?,
      created_at: decode_dt(&self.created_at)?,
      balance: decode_amount(self.balance)?,
      balance_limit: decode_amount(self.balance_limit)?,
      controllers,
    })
  }
}

fn account_id(tx: &Transaction<'_>, address: &Address) -> Result<Option<String>> {
  Ok(
    tx.query_row(
      "SELECT id FROM ethereum_accounts WHERE public_key = ?1",
      params![address.as_str()],
      |row| row.get(0),
    )
    .optional()?,
  )
}

/// Ensure `address` has a record, returning its row id.
pub fn require(tx: &Transaction<'_>, address: &Address) -> Result<String> {
  account_id(tx, address)?
    .ok_or_else(|| registro_core::Error::AccountNotFound(address.clone()).into())
}

/// Create the address record, its balance limit and one `UNVERIFIED`
/// controller for the requesting participant.
pub fn create(
  tx: &Transaction<'_>,
  clock: &Clock,
  account: &NewAccount,
  balance_limit: u64,
) -> Result<()> {
  account.check_limit(balance_limit)?;

  if !participants::exists(tx, account.participant_id)? {
    return Err(registro_core::Error::ParticipantNotFound(account.participant_id).into());
  }
  if account_id(tx, &account.address)?.is_some() {
    return Err(Error::Conflict(format!("address already exists: {}", account.address)));
  }

  let now = encode_dt(clock.now());
  let row_id = encode_uuid(Uuid::new_v4());
  tx.execute(
    "INSERT INTO ethereum_accounts (id, public_key, balance, created_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![row_id, account.address.as_str(), encode_amount(account.balance)?, now],
  )?;
  tx.execute(
    "INSERT INTO balance_limits (id, address_id, amount, created_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![encode_uuid(Uuid::new_v4()), row_id, encode_amount(balance_limit)?, now],
  )?;

  let controller_id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO account_controllers (id, address_id, participant_id, created_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![encode_uuid(controller_id), row_id, encode_uuid(account.participant_id), now],
  )?;
  CONTROLLER_STATUSES.append(tx, clock, controller_id, ControllerStatus::Unverified.into())?;

  Ok(())
}

/// Every controller of the account with row id `account_id`, each with the
/// status from the newest row of its history.
fn controllers(tx: &Transaction<'_>, account_id: &str) -> Result<Vec<AccountController>> {
  let sql = format!(
    "SELECT ac.id, s.status, {PARTICIPANT_COLUMNS}
     FROM account_controllers ac
     {}
     JOIN participants p ON p.id = ac.participant_id
     {PARTICIPANT_JOINS}
     WHERE ac.address_id = ?1
     ORDER BY ac.created_at",
    latest_status_join("account_controller_statuses", "s", "controller_id", "ac"),
  );
  let mut stmt = tx.prepare(&sql)?;
  let rows = stmt
    .query_map(params![account_id], |row| {
      Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        RawParticipant::read(row, 2)?,
      ))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(id, status, participant)| {
      Ok(AccountController {
        id:          decode_uuid(&id)?,
        status:      decode_enum(status)?,
        participant: participant.into_participant()?,
      })
    })
    .collect()
}

pub fn fetch(tx: &Transaction<'_>, address: &Address) -> Result<RetrievedAccount> {
  let sql = format!("{ACCOUNT_SELECT} WHERE e.public_key = ?1");
  let raw = tx
    .query_row(&sql, params![address.as_str()], RawAccount::read)
    .optional()?
    .ok_or_else(|| registro_core::Error::AccountNotFound(address.clone()))?;
  raw.into_account(tx)
}

pub fn list(
  tx: &Transaction<'_>,
  query: &AccountQuery,
) -> Result<Page<RetrievedAccount, AccountQuery>> {
  let mut filter = Filter::default();
  filter.window("e.created_at", query.window);
  let (sql, values) = filter.finish(ACCOUNT_SELECT, "e.created_at", query.sort, query.limit);

  let mut stmt = tx.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(values), RawAccount::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let results = raws
    .into_iter()
    .map(|raw| raw.into_account(tx))
    .collect::<Result<Vec<_>>>()?;

  Ok(Page::new(results, query, |a| a.created_at))
}

/// Append `VERIFIED` to the history of the controller binding
/// `participant_id` to `address`.
pub fn verify_controller(
  tx: &Transaction<'_>,
  clock: &Clock,
  address: &Address,
  participant_id: Uuid,
) -> Result<Uuid> {
  let not_found = || registro_core::Error::AccountControllerNotFound {
    address: address.clone(),
    participant_id,
  };

  let controller_id: String = tx
    .query_row(
      "SELECT ac.id
       FROM account_controllers ac
       JOIN ethereum_accounts e ON e.id = ac.address_id
       WHERE e.public_key = ?1 AND ac.participant_id = ?2",
      params![address.as_str(), encode_uuid(participant_id)],
      |row| row.get(0),
    )
    .optional()?
    .ok_or_else(not_found)?;
  let controller_id = decode_uuid(&controller_id)?;

  let history = CONTROLLER_STATUSES.history::<ControllerStatus>(tx, controller_id)?;
  let verified =
    ControllerRecord::from_history(controller_id, address.clone(), participant_id, &history)?
      .into_unverified()?
      .verify();

  CONTROLLER_STATUSES.append(tx, clock, verified.id(), verified.status().into())?;
  Ok(verified.id())
}

/// Overwrite balances of the listed addresses that exist; returns how many
/// records changed. For repeated addresses the last entry wins.
pub fn bulk_update_balances(tx: &Transaction<'_>, updates: &[BalanceUpdate]) -> Result<usize> {
  tx.execute_batch(
    "CREATE TEMP TABLE IF NOT EXISTS staged_balances (
       public_key TEXT PRIMARY KEY,
       balance    INTEGER NOT NULL
     );
     DELETE FROM staged_balances;",
  )?;

  {
    let mut stage = tx.prepare(
      "INSERT OR REPLACE INTO staged_balances (public_key, balance) VALUES (?1, ?2)",
    )?;
    for update in updates {
      stage.execute(params![update.address.as_str(), encode_amount(update.balance)?])?;
    }
  }

  let updated = tx.execute(
    "UPDATE ethereum_accounts
     SET balance = (
       SELECT s.balance FROM staged_balances s
       WHERE s.public_key = ethereum_accounts.public_key
     )
     WHERE public_key IN (SELECT public_key FROM staged_balances)",
    [],
  )?;

  tx.execute_batch("DROP TABLE staged_balances;")?;
  Ok(updated)
}
