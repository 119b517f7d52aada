//! On-chain account addresses.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Total length of an address, including the `0x` prefix.
pub const ADDRESS_LEN: usize = 42;

/// A `0x`-prefixed, 40-hex-digit account address.
///
/// Case is preserved exactly as supplied; two addresses differing only in
/// letter case are distinct values.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
  pub fn parse(value: impl Into<String>) -> Result<Self> {
    let value = value.into();
    if value.len() != ADDRESS_LEN {
      return Err(Error::validation(format!(
        "{value} is not a valid address: expected {ADDRESS_LEN} characters, \
         got {}",
        value.len()
      )));
    }
    let Some(digits) = value.strip_prefix("0x") else {
      return Err(Error::validation(format!(
        "{value} is not a valid address: missing 0x prefix"
      )));
    };
    if hex::decode(digits).is_err() {
      return Err(Error::validation(format!(
        "{value} is not a valid address: non-hex characters"
      )));
    }
    Ok(Self(value))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for Address {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(value) }
}

impl From<Address> for String {
  fn from(address: Address) -> Self { address.0 }
}

impl AsRef<str> for Address {
  fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
