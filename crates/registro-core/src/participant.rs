//! Participants: the four mutually exclusive kinds of registered entity.
//!
//! A participant is stored as one shared row plus exactly one detail row
//! chosen by its [`ParticipantType`]. Reads arrive as a single wide outer
//! join in which every detail group except the true one is null;
//! [`Participant::from_columns`] turns such a row back into a typed value
//! without touching the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  identification::{Identification, IdentificationType, IdentificationUpdate},
};

// ─── Discriminants ───────────────────────────────────────────────────────────

/// The discriminator stored on every participant row.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
  NaturalPerson,
  GovernmentOrganism,
  Company,
  Academic,
}

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
pub enum EducationLevel {
  School,
  Highschool,
  University,
}

// ─── Variants ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalPerson {
  pub first_name:     String,
  pub last_name:      String,
  pub identification: Identification,
}

impl NaturalPerson {
  pub fn is_named(&self, first_name: &str, last_name: &str) -> bool {
    self.first_name == first_name && self.last_name == last_name
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
  pub full_name: String,
  pub cuit:      String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernmentOrganism {
  pub full_name: String,
  pub sector:    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Academic {
  pub full_name:       String,
  pub education_level: EducationLevel,
}

/// The type-specific half of a participant. Also the creation payload: the
/// `type` tag selects which variant constructor runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantDetails {
  NaturalPerson(NaturalPerson),
  GovernmentOrganism(GovernmentOrganism),
  Company(Company),
  Academic(Academic),
}

impl ParticipantDetails {
  pub fn kind(&self) -> ParticipantType {
    match self {
      Self::NaturalPerson(_) => ParticipantType::NaturalPerson,
      Self::GovernmentOrganism(_) => ParticipantType::GovernmentOrganism,
      Self::Company(_) => ParticipantType::Company,
      Self::Academic(_) => ParticipantType::Academic,
    }
  }

  /// Reject blank names before anything is written.
  pub fn validate(&self) -> Result<()> {
    match self {
      Self::NaturalPerson(p) => {
        not_blank("first_name", &p.first_name)?;
        not_blank("last_name", &p.last_name)
      }
      Self::GovernmentOrganism(g) => {
        not_blank("full_name", &g.full_name)?;
        not_blank("sector", &g.sector)
      }
      Self::Company(c) => {
        not_blank("full_name", &c.full_name)?;
        not_blank("cuit", &c.cuit)
      }
      Self::Academic(a) => not_blank("full_name", &a.full_name),
    }
  }

  /// Return a copy with `update` applied. Fields the update leaves as `None`
  /// are carried over unchanged. The update must target the same type.
  pub fn updated(&self, update: &ParticipantUpdate) -> Result<Self> {
    let next = match (self, update) {
      (Self::NaturalPerson(p), ParticipantUpdate::NaturalPerson(u)) => {
        let identification = match &u.identification {
          Some(id_update) => p.identification.merged(id_update)?,
          None => p.identification.clone(),
        };
        Self::NaturalPerson(NaturalPerson {
          first_name: pick(&u.first_name, &p.first_name),
          last_name: pick(&u.last_name, &p.last_name),
          identification,
        })
      }
      (Self::GovernmentOrganism(g), ParticipantUpdate::GovernmentOrganism(u)) => {
        Self::GovernmentOrganism(GovernmentOrganism {
          full_name: pick(&u.full_name, &g.full_name),
          sector:    pick(&u.sector, &g.sector),
        })
      }
      (Self::Company(c), ParticipantUpdate::Company(u)) => Self::Company(Company {
        full_name: pick(&u.full_name, &c.full_name),
        cuit:      pick(&u.cuit, &c.cuit),
      }),
      (Self::Academic(a), ParticipantUpdate::Academic(u)) => Self::Academic(Academic {
        full_name:       pick(&u.full_name, &a.full_name),
        education_level: u.education_level.unwrap_or(a.education_level),
      }),
      _ => {
        return Err(Error::validation(format!(
          "cannot apply a {} update to a {} participant",
          update.kind(),
          self.kind()
        )));
      }
    };

    next.validate()?;
    Ok(next)
  }

  /// Reassemble the details of type `kind` from the columns of a wide join.
  ///
  /// Columns belonging to other types are ignored. If the columns for `kind`
  /// are missing the row is inconsistent and [`Error::MissingDetails`] is
  /// returned rather than a defaulted value.
  pub fn from_columns(
    id: Uuid,
    kind: ParticipantType,
    columns: DetailColumns,
  ) -> Result<Self> {
    let missing = || Error::MissingDetails { id, kind };

    let details = match kind {
      ParticipantType::Company => {
        let (Some(full_name), Some(cuit)) =
          (columns.company_full_name, columns.company_cuit)
        else {
          return Err(missing());
        };
        Self::Company(Company { full_name, cuit })
      }
      ParticipantType::GovernmentOrganism => {
        let (Some(full_name), Some(sector)) =
          (columns.government_full_name, columns.government_sector)
        else {
          return Err(missing());
        };
        Self::GovernmentOrganism(GovernmentOrganism { full_name, sector })
      }
      ParticipantType::NaturalPerson => {
        let (Some(first_name), Some(last_name), Some(id_type), Some(id_value)) = (
          columns.first_name,
          columns.last_name,
          columns.identification_type,
          columns.identification_value,
        ) else {
          return Err(missing());
        };
        let id_type: IdentificationType = id_type
          .parse()
          .map_err(|_| Error::UnknownDiscriminant(id_type))?;
        Self::NaturalPerson(NaturalPerson {
          first_name,
          last_name,
          identification: Identification::new(id_type, id_value)?,
        })
      }
      ParticipantType::Academic => {
        let (Some(full_name), Some(level)) =
          (columns.academic_full_name, columns.education_level)
        else {
          return Err(missing());
        };
        let education_level: EducationLevel =
          level.parse().map_err(|_| Error::UnknownDiscriminant(level))?;
        Self::Academic(Academic { full_name, education_level })
      }
    };
    Ok(details)
  }
}

fn pick(update: &Option<String>, current: &str) -> String {
  update.clone().unwrap_or_else(|| current.to_owned())
}

fn not_blank(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(format!("{field} must not be blank")));
  }
  Ok(())
}

/// Nullable detail columns of the participant ⨝ company ⨝ government ⨝
/// natural person ⨝ identification ⨝ academic join.
#[derive(Debug, Clone, Default)]
pub struct DetailColumns {
  pub company_full_name:    Option<String>,
  pub company_cuit:         Option<String>,
  pub government_full_name: Option<String>,
  pub government_sector:    Option<String>,
  pub first_name:           Option<String>,
  pub last_name:            Option<String>,
  pub identification_type:  Option<String>,
  pub identification_value: Option<String>,
  pub academic_full_name:   Option<String>,
  pub education_level:      Option<String>,
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// A fully typed participant as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub id:          Uuid,
  pub created_at:  DateTime<Utc>,
  pub is_verified: bool,
  #[serde(flatten)]
  pub details:     ParticipantDetails,
}

impl Participant {
  /// Merge the shared participant columns with the type-specific ones.
  pub fn from_columns(
    id: Uuid,
    created_at: DateTime<Utc>,
    is_verified: bool,
    kind: ParticipantType,
    columns: DetailColumns,
  ) -> Result<Self> {
    Ok(Self {
      id,
      created_at,
      is_verified,
      details: ParticipantDetails::from_columns(id, kind, columns)?,
    })
  }

  pub fn kind(&self) -> ParticipantType { self.details.kind() }

  pub fn is_identified_as(&self, id: Uuid) -> bool { self.id == id }

  pub fn is_verified(&self) -> bool { self.is_verified }

  /// Compares against `full_name`, or `"first last"` for a natural person.
  pub fn is_named(&self, name: &str) -> bool {
    match &self.details {
      ParticipantDetails::NaturalPerson(p) => {
        name
          .strip_prefix(p.first_name.as_str())
          .and_then(|rest| rest.strip_prefix(' '))
          .is_some_and(|last| last == p.last_name)
      }
      ParticipantDetails::GovernmentOrganism(g) => g.full_name == name,
      ParticipantDetails::Company(c) => c.full_name == name,
      ParticipantDetails::Academic(a) => a.full_name == name,
    }
  }

  pub fn has_dni(&self, dni: &str) -> bool {
    matches!(&self.details, ParticipantDetails::NaturalPerson(p) if p.identification.is_dni(dni))
  }

  pub fn has_cuit(&self, cuit: &str) -> bool {
    matches!(&self.details, ParticipantDetails::Company(c) if c.cuit == cuit)
  }

  pub fn is_sector(&self, sector: &str) -> bool {
    matches!(&self.details, ParticipantDetails::GovernmentOrganism(g) if g.sector == sector)
  }
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalPersonUpdate {
  #[serde(default)]
  pub first_name:     Option<String>,
  #[serde(default)]
  pub last_name:      Option<String>,
  #[serde(default)]
  pub identification: Option<IdentificationUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyUpdate {
  #[serde(default)]
  pub full_name: Option<String>,
  #[serde(default)]
  pub cuit:      Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernmentOrganismUpdate {
  #[serde(default)]
  pub full_name: Option<String>,
  #[serde(default)]
  pub sector:    Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicUpdate {
  #[serde(default)]
  pub full_name:       Option<String>,
  #[serde(default)]
  pub education_level: Option<EducationLevel>,
}

/// A partial update; each variant only accepts its own field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantUpdate {
  NaturalPerson(NaturalPersonUpdate),
  GovernmentOrganism(GovernmentOrganismUpdate),
  Company(CompanyUpdate),
  Academic(AcademicUpdate),
}

impl ParticipantUpdate {
  pub fn kind(&self) -> ParticipantType {
    match self {
      Self::NaturalPerson(_) => ParticipantType::NaturalPerson,
      Self::GovernmentOrganism(_) => ParticipantType::GovernmentOrganism,
      Self::Company(_) => ParticipantType::Company,
      Self::Academic(_) => ParticipantType::Academic,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn person() -> ParticipantDetails {
    ParticipantDetails::NaturalPerson(NaturalPerson {
      first_name:     "Ada".into(),
      last_name:      "Lovelace".into(),
      identification: Identification::new(IdentificationType::Dni, "30111222")
        .unwrap(),
    })
  }

  fn natural_columns() -> DetailColumns {
    DetailColumns {
      first_name: Some("Ada".into()),
      last_name: Some("Lovelace".into()),
      identification_type: Some("DNI".into()),
      identification_value: Some("30111222".into()),
      ..Default::default()
    }
  }

  #[test]
  fn reconstructs_natural_person_with_identification() {
    let id = Uuid::new_v4();
    let p = Participant::from_columns(
      id,
      Utc::now(),
      false,
      ParticipantType::NaturalPerson,
      natural_columns(),
    )
    .unwrap();
    assert_eq!(p.details, person());
    assert!(p.has_dni("30111222"));
    assert!(p.is_named("Ada Lovelace"));
    assert!(!p.is_verified());
  }

  #[test]
  fn ignores_columns_of_other_types() {
    let mut columns = natural_columns();
    columns.company_full_name = Some("Stray".into());
    columns.company_cuit = Some("20-1-1".into());
    let details = ParticipantDetails::from_columns(
      Uuid::new_v4(),
      ParticipantType::NaturalPerson,
      columns,
    )
    .unwrap();
    assert_eq!(details.kind(), ParticipantType::NaturalPerson);
  }

  #[test]
  fn missing_details_fail_loudly() {
    let id = Uuid::new_v4();
    let err =
      ParticipantDetails::from_columns(id, ParticipantType::Company, natural_columns())
        .unwrap_err();
    assert!(matches!(
      err,
      Error::MissingDetails { id: got, kind: ParticipantType::Company } if got == id
    ));
  }

  #[test]
  fn unknown_education_level_is_rejected() {
    let columns = DetailColumns {
      academic_full_name: Some("UBA".into()),
      education_level: Some("KINDERGARTEN".into()),
      ..Default::default()
    };
    let err = ParticipantDetails::from_columns(
      Uuid::new_v4(),
      ParticipantType::Academic,
      columns,
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownDiscriminant(s) if s == "KINDERGARTEN"));
  }

  #[test]
  fn update_only_touches_present_fields() {
    let update = ParticipantUpdate::NaturalPerson(NaturalPersonUpdate {
      last_name: Some("Byron".into()),
      ..Default::default()
    });
    let ParticipantDetails::NaturalPerson(p) = person().updated(&update).unwrap() else {
      panic!("kind changed");
    };
    assert_eq!(p.first_name, "Ada");
    assert_eq!(p.last_name, "Byron");
    assert!(p.identification.is_dni("30111222"));
  }

  #[test]
  fn update_of_another_type_is_rejected() {
    let update = ParticipantUpdate::Company(CompanyUpdate {
      cuit: Some("30-1-1".into()),
      ..Default::default()
    });
    assert!(matches!(person().updated(&update), Err(Error::Validation(_))));
  }

  #[test]
  fn creation_payload_is_tagged_by_type() {
    let json = r#"{"type":"ACADEMIC","full_name":"UTN","education_level":"UNIVERSITY"}"#;
    let details: ParticipantDetails = serde_json::from_str(json).unwrap();
    assert_eq!(
      details,
      ParticipantDetails::Academic(Academic {
        full_name:       "UTN".into(),
        education_level: EducationLevel::University,
      })
    );

    let update: ParticipantUpdate =
      serde_json::from_str(r#"{"type":"GOVERNMENT_ORGANISM","sector":"health"}"#).unwrap();
    assert_eq!(update.kind(), ParticipantType::GovernmentOrganism);
  }

  #[test]
  fn participant_serialises_flat_with_type_tag() {
    let p = Participant {
      id:          Uuid::nil(),
      created_at:  Utc::now(),
      is_verified: true,
      details:     ParticipantDetails::Company(Company {
        full_name: "Acme".into(),
        cuit:      "30-71234567-1".into(),
      }),
    };
    let value = serde_json::to_value(&p).unwrap();
    assert_eq!(value["type"], "COMPANY");
    assert_eq!(value["cuit"], "30-71234567-1");
    assert!(p.has_cuit("30-71234567-1"));
    assert!(!p.is_sector("30-71234567-1"));
  }

  #[test]
  fn natural_person_matches_full_name_with_compound_first_name() {
    let p = Participant {
      id:          Uuid::nil(),
      created_at:  Utc::now(),
      is_verified: false,
      details:     ParticipantDetails::NaturalPerson(NaturalPerson {
        first_name:     "María José".into(),
        last_name:      "Pérez".into(),
        identification: Identification::new(IdentificationType::Dni, "30111222")
          .unwrap(),
      }),
    };
    assert!(p.is_named("María José Pérez"));
    assert!(!p.is_named("María José"));
    assert!(!p.is_named("María JoséPérez"));
    assert!(!p.is_named("María"));
  }
}
