//! National identification documents owned by natural persons.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// The kind of document an [`Identification`] refers to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum IdentificationType {
  Dni,
  Cuit,
  Le,
}

/// A typed national-ID value. Construct through [`Identification::new`] or
/// deserialisation; both reject blank values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIdentification")]
pub struct Identification {
  #[serde(rename = "type")]
  kind:  IdentificationType,
  value: String,
}

impl Identification {
  pub fn new(kind: IdentificationType, value: impl Into<String>) -> Result<Self> {
    let value = value.into();
    if value.trim().is_empty() {
      return Err(Error::validation(format!(
        "{kind} identification value must not be blank"
      )));
    }
    Ok(Self { kind, value })
  }

  pub fn kind(&self) -> IdentificationType { self.kind }

  pub fn value(&self) -> &str { &self.value }

  pub fn is_dni(&self, dni: &str) -> bool {
    self.kind == IdentificationType::Dni && self.value == dni
  }

  /// Apply a partial update, keeping any field left as `None`.
  pub fn merged(&self, update: &IdentificationUpdate) -> Result<Self> {
    Self::new(
      update.kind.unwrap_or(self.kind),
      update.value.clone().unwrap_or_else(|| self.value.clone()),
    )
  }
}

#[derive(Deserialize)]
struct RawIdentification {
  #[serde(rename = "type")]
  kind:  IdentificationType,
  value: String,
}

impl TryFrom<RawIdentification> for Identification {
  type Error = Error;

  fn try_from(raw: RawIdentification) -> Result<Self> {
    Self::new(raw.kind, raw.value)
  }
}

/// Partial update for an [`Identification`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentificationUpdate {
  #[serde(rename = "type", default)]
  pub kind:  Option<IdentificationType>,
  #[serde(default)]
  pub value: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn type_strings_are_uppercase() {
    assert_eq!(IdentificationType::Dni.to_string(), "DNI");
    assert_eq!("CUIT".parse::<IdentificationType>().unwrap(), IdentificationType::Cuit);
    assert!("dni".parse::<IdentificationType>().is_err());
  }

  #[test]
  fn blank_values_are_rejected() {
    assert!(Identification::new(IdentificationType::Le, "  ").is_err());
    let json = r#"{"type":"DNI","value":""}"#;
    assert!(serde_json::from_str::<Identification>(json).is_err());
  }

  #[test]
  fn has_dni_requires_matching_type() {
    let dni = Identification::new(IdentificationType::Dni, "30111222").unwrap();
    let le = Identification::new(IdentificationType::Le, "30111222").unwrap();
    assert!(dni.is_dni("30111222"));
    assert!(!le.is_dni("30111222"));
  }

  #[test]
  fn merge_keeps_absent_fields() {
    let id = Identification::new(IdentificationType::Dni, "1").unwrap();
    let merged = id
      .merged(&IdentificationUpdate { kind: Some(IdentificationType::Le), value: None })
      .unwrap();
    assert_eq!(merged.kind(), IdentificationType::Le);
    assert_eq!(merged.value(), "1");
  }
}
