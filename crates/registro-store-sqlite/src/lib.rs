//! SQLite backend for the Registro participant registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Each store operation is one
//! `rusqlite` transaction, handed explicitly to the per-entity modules.

mod accounts;
mod clock;
mod customers;
mod encode;
mod filter;
mod participants;
mod recharges;
mod schema;
mod status;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
