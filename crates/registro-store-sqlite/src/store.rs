//! [`SqliteStore`]: the SQLite implementation of [`RegistryStore`].

use std::{path::Path, sync::Arc};

use rusqlite::Transaction;
use uuid::Uuid;

use registro_core::{
  account::{BalanceUpdate, NewAccount, RetrievedAccount},
  address::Address,
  customer::{Customer, RetrievedCustomer},
  listing::Page,
  participant::{Participant, ParticipantDetails, ParticipantUpdate},
  recharge::{RetrievedRecharge, WaitingRecharge},
  store::{AccountQuery, CustomerQuery, ParticipantQuery, RechargeQuery, RegistryStore},
};

use crate::{Error, Result, accounts, clock::Clock, customers, participants, recharges, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registry store backed by a single SQLite file.
///
/// Cloning shares the inner connection and clock.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Arc<Clock>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, clock: Arc::default() })
  }

  /// Run `f` inside one transaction on the connection thread. The
  /// transaction commits only if `f` succeeds.
  async fn transact<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Transaction<'_>, &Clock) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let clock = Arc::clone(&self.clock);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let out = f(&tx, &clock);
        if out.is_ok() {
          tx.commit()?;
        }
        Ok(out)
      })
      .await?
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  // ── Participants ──────────────────────────────────────────────────────────

  async fn create_participant(&self, details: ParticipantDetails) -> Result<Uuid> {
    let kind = details.kind();
    let id = self
      .transact(move |tx, clock| participants::insert(tx, clock, &details))
      .await?;
    tracing::debug!(%id, %kind, "participant created");
    Ok(id)
  }

  async fn retrieve_participant(&self, id: Uuid) -> Result<Participant> {
    self.transact(move |tx, _| participants::fetch(tx, id)).await
  }

  async fn update_participant(
    &self,
    id: Uuid,
    update: ParticipantUpdate,
  ) -> Result<Participant> {
    let participant = self
      .transact(move |tx, clock| participants::update(tx, clock, id, &update))
      .await?;
    tracing::debug!(%id, "participant updated");
    Ok(participant)
  }

  async fn verify_participant(&self, id: Uuid) -> Result<Participant> {
    let participant = self
      .transact(move |tx, clock| participants::verify(tx, clock, id))
      .await?;
    tracing::debug!(%id, "participant verified");
    Ok(participant)
  }

  async fn list_participants(
    &self,
    query: ParticipantQuery,
  ) -> Result<Page<Participant, ParticipantQuery>> {
    self.transact(move |tx, _| participants::list(tx, &query)).await
  }

  // ── Accounts and controllers ──────────────────────────────────────────────

  async fn create_account(&self, account: NewAccount, balance_limit: u64) -> Result<()> {
    let address = account.address.clone();
    self
      .transact(move |tx, clock| accounts::create(tx, clock, &account, balance_limit))
      .await?;
    tracing::debug!(%address, balance_limit, "account created");
    Ok(())
  }

  async fn retrieve_account(&self, address: Address) -> Result<RetrievedAccount> {
    self.transact(move |tx, _| accounts::fetch(tx, &address)).await
  }

  async fn list_accounts(
    &self,
    query: AccountQuery,
  ) -> Result<Page<RetrievedAccount, AccountQuery>> {
    self.transact(move |tx, _| accounts::list(tx, &query)).await
  }

  async fn verify_controller(&self, address: Address, participant_id: Uuid) -> Result<()> {
    let logged = address.clone();
    let controller_id = self
      .transact(move |tx, clock| {
        accounts::verify_controller(tx, clock, &address, participant_id)
      })
      .await?;
    tracing::debug!(address = %logged, %participant_id, %controller_id, "controller verified");
    Ok(())
  }

  async fn bulk_update_balances(&self, updates: Vec<BalanceUpdate>) -> Result<usize> {
    let requested = updates.len();
    let updated = self
      .transact(move |tx, _| accounts::bulk_update_balances(tx, &updates))
      .await?;
    tracing::debug!(requested, updated, "balances updated");
    Ok(updated)
  }

  // ── Recharges ─────────────────────────────────────────────────────────────

  async fn request_recharge(&self, address: Address) -> Result<Uuid> {
    let logged = address.clone();
    let id = self
      .transact(move |tx, clock| recharges::insert(tx, clock, &address))
      .await?;
    tracing::debug!(%id, address = %logged, "recharge requested");
    Ok(id)
  }

  async fn retrieve_recharge(&self, id: Uuid) -> Result<RetrievedRecharge> {
    self.transact(move |tx, _| recharges::fetch(tx, id)).await
  }

  async fn satisfy_recharge(&self, id: Uuid) -> Result<RetrievedRecharge> {
    let recharge = self
      .transact(move |tx, clock| {
        recharges::transition(tx, clock, id, WaitingRecharge::satisfy)
      })
      .await?;
    tracing::debug!(%id, "recharge satisfied");
    Ok(recharge)
  }

  async fn reject_recharge(&self, id: Uuid) -> Result<RetrievedRecharge> {
    let recharge = self
      .transact(move |tx, clock| recharges::transition(tx, clock, id, WaitingRecharge::reject))
      .await?;
    tracing::debug!(%id, "recharge rejected");
    Ok(recharge)
  }

  async fn list_recharges(
    &self,
    query: RechargeQuery,
  ) -> Result<Page<RetrievedRecharge, RechargeQuery>> {
    self.transact(move |tx, _| recharges::list(tx, &query)).await
  }

  // ── Customers ─────────────────────────────────────────────────────────────

  async fn create_customer(&self, customer: Customer) -> Result<Uuid> {
    let id = self
      .transact(move |tx, clock| customers::insert(tx, clock, &customer))
      .await?;
    tracing::debug!(%id, "customer created");
    Ok(id)
  }

  async fn retrieve_customer(&self, id: Uuid) -> Result<RetrievedCustomer> {
    self.transact(move |tx, _| customers::fetch(tx, id)).await
  }

  async fn update_customer(&self, id: Uuid, customer: Customer) -> Result<RetrievedCustomer> {
    let updated = self
      .transact(move |tx, clock| customers::update(tx, clock, id, &customer))
      .await?;
    tracing::debug!(%id, "customer updated");
    Ok(updated)
  }

  async fn list_customers(
    &self,
    query: CustomerQuery,
  ) -> Result<Page<RetrievedCustomer, CustomerQuery>> {
    self.transact(move |tx, _| customers::list(tx, &query)).await
  }
}
