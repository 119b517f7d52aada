//! Integration tests for `SqliteStore` against an in-memory database.

use registro_core::{
  address::Address,
  identification::{Identification, IdentificationType},
  participant::{
    Academic, Company, EducationLevel, GovernmentOrganism, NaturalPerson, ParticipantDetails,
  },
  store::RegistryStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};


async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A distinct valid address for every `n`.
fn address(n: u32) -> Address {
  Address::parse(format!("0x{n:040x}")).unwrap()
}

/// Unwrap the domain error carried by a store error.
fn core(err: Error) -> registro_core::Error {
  match err {
    Error::Core(err) => err,
    other => panic!("expected a domain error, got {other:?}"),
  }
}

fn person() -> ParticipantDetails {
  ParticipantDetails::NaturalPerson(NaturalPerson {
    first_name:     "Juana".into(),
    last_name:      "Azurduy".into(),
    identification: Identification::new(IdentificationType::Dni, "12345678").unwrap(),
  })
}

fn company() -> ParticipantDetails {
  ParticipantDetails::Company(Company {
    full_name: "Acme S.A.".into(),
    cuit:      "30-71234567-1".into(),
  })
}

fn government() -> ParticipantDetails {
  ParticipantDetails::GovernmentOrganism(GovernmentOrganism {
    full_name: "Ministerio de Economía".into(),
    sector:    "finance".into(),
  })
}

fn academic() -> ParticipantDetails {
  ParticipantDetails::Academic(Academic {
    full_name:       "Universidad Nacional".into(),
    education_level: EducationLevel::University,
  })
}

/// Create a company participant and an account it controls.
async fn account_for(s: &SqliteStore, n: u32, balance: u64) -> (Address, Uuid) {
  let participant = s.create_participant(company()).await.unwrap();
  let address = address(n);
  let mut account = registro_core::account::NewAccount::new(address.clone(), participant);
  account.balance = balance;
  s.create_account(account, BALANCE_LIMIT).await.unwrap();
  (address, participant)
}

const BALANCE_LIMIT: u64 = 100_000_000;
