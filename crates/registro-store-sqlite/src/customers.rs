//! Customer records.

use registro_core::{
  customer::{Customer, RetrievedCustomer},
  listing::Page,
  store::CustomerQuery,
};
use rusqlite::{OptionalExtension as _, Row, Transaction, params, params_from_iter};
use uuid::Uuid;

use crate::{
  Result,
  clock::Clock,
  encode::{decode_dt, decode_uuid, encode_dt, encode_uuid},
  filter::Filter,
};

const CUSTOMER_SELECT: &str = "SELECT c.id, c.name, c.created_at, c.updated_at FROM customers c";

struct RawCustomer {
  id:         String,
  name:       String,
  created_at: String,
  updated_at: String,
}

impl RawCustomer {
  fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
      updated_at: row.get(3)?,
    })
  }

  fn into_customer(self) -> Result<RetrievedCustomer> {
    Ok(RetrievedCustomer {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub fn insert(tx: &Transaction<'_>, clock: &Clock, customer: &Customer) -> Result<Uuid> {
  customer.validate()?;
  let id = Uuid::new_v4();
  let now = encode_dt(clock.now());
  tx.execute(
    "INSERT INTO customers (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
    params![encode_uuid(id), customer.name, now],
  )?;
  Ok(id)
}

pub fn fetch(tx: &Transaction<'_>, id: Uuid) -> Result<RetrievedCustomer> {
  let sql = format!("{CUSTOMER_SELECT} WHERE c.id = ?1");
  tx.query_row(&sql, params![encode_uuid(id)], RawCustomer::read)
    .optional()?
    .ok_or(registro_core::Error::CustomerNotFound(id))?
    .into_customer()
}

pub fn update(
  tx: &Transaction<'_>,
  clock: &Clock,
  id: Uuid,
  customer: &Customer,
) -> Result<RetrievedCustomer> {
  customer.validate()?;
  let changed = tx.execute(
    "UPDATE customers SET name = ?1, updated_at = ?2 WHERE id = ?3",
    params![customer.name, encode_dt(clock.now()), encode_uuid(id)],
  )?;
  if changed == 0 {
    return Err(registro_core::Error::CustomerNotFound(id).into());
  }
  fetch(tx, id)
}

pub fn list(
  tx: &Transaction<'_>,
  query: &CustomerQuery,
) -> Result<Page<RetrievedCustomer, CustomerQuery>> {
  let mut filter = Filter::default();
  filter.window("c.created_at", query.window);
  let (sql, values) = filter.finish(CUSTOMER_SELECT, "c.created_at", query.sort, query.limit);

  let mut stmt = tx.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(values), RawCustomer::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let results = raws
    .into_iter()
    .map(RawCustomer::into_customer)
    .collect::<Result<Vec<_>>>()?;

  Ok(Page::new(results, query, |c| c.created_at))
}
