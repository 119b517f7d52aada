//! Customers of the registry operator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Creation and update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
  pub name: String,
}

impl Customer {
  pub fn new(name: impl Into<String>) -> Result<Self> {
    let customer = Self { name: name.into() };
    customer.validate()?;
    Ok(customer)
  }

  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::validation("customer name must not be blank"));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedCustomer {
  pub id:         Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl RetrievedCustomer {
  pub fn is_named(&self, name: &str) -> bool { self.name == name }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_names_are_rejected() {
    assert!(Customer::new("  ").is_err());
    assert_eq!(Customer::new("Fondo Sur").unwrap().name, "Fondo Sur");
  }
}
