//! Participant persistence: the shared row, the four detail tables and the
//! wide join that reads them back.

use registro_core::{
  listing::Page,
  participant::{Participant, ParticipantDetails, ParticipantUpdate},
  store::ParticipantQuery,
};
use rusqlite::{OptionalExtension as _, Transaction, params, params_from_iter, types::Value};
use uuid::Uuid;

use crate::{
  Result,
  clock::Clock,
  encode::{PARTICIPANT_COLUMNS, PARTICIPANT_JOINS, RawParticipant, encode_dt, encode_uuid},
  filter::Filter,
};

/// Insert the participant row and its detail rows; returns the new id.
pub fn insert(tx: &Transaction<'_>, clock: &Clock, details: &ParticipantDetails) -> Result<Uuid> {
  details.validate()?;

  let id = Uuid::new_v4();
  let id_str = encode_uuid(id);
  let now = encode_dt(clock.now());
  let kind: &'static str = details.kind().into();

  tx.execute(
    "INSERT INTO participants (id, type, is_verified, created_at, updated_at)
     VALUES (?1, ?2, 0, ?3, ?3)",
    params![id_str, kind, now],
  )?;

  match details {
    ParticipantDetails::Company(c) => {
      tx.execute(
        "INSERT INTO companies (id, participant_id, full_name, cuit)
         VALUES (?1, ?2, ?3, ?4)",
        params![encode_uuid(Uuid::new_v4()), id_str, c.full_name, c.cuit],
      )?;
    }
    ParticipantDetails::GovernmentOrganism(g) => {
      tx.execute(
        "INSERT INTO government_organisms (id, participant_id, full_name, sector)
         VALUES (?1, ?2, ?3, ?4)",
        params![encode_uuid(Uuid::new_v4()), id_str, g.full_name, g.sector],
      )?;
    }
    ParticipantDetails::NaturalPerson(p) => {
      let person_id = encode_uuid(Uuid::new_v4());
      tx.execute(
        "INSERT INTO natural_persons (id, participant_id, first_name, last_name)
         VALUES (?1, ?2, ?3, ?4)",
        params![person_id, id_str, p.first_name, p.last_name],
      )?;
      let id_type: &'static str = p.identification.kind().into();
      tx.execute(
        "INSERT INTO identifications (id, person_id, type, value)
         VALUES (?1, ?2, ?3, ?4)",
        params![
          encode_uuid(Uuid::new_v4()),
          person_id,
          id_type,
          p.identification.value()
        ],
      )?;
    }
    ParticipantDetails::Academic(a) => {
      let level: &'static str = a.education_level.into();
      tx.execute(
        "INSERT INTO academics (id, participant_id, full_name, education_level)
         VALUES (?1, ?2, ?3, ?4)",
        params![encode_uuid(Uuid::new_v4()), id_str, a.full_name, level],
      )?;
    }
  }

  Ok(id)
}

pub fn exists(tx: &Transaction<'_>, id: Uuid) -> Result<bool> {
  let found = tx
    .query_row(
      "SELECT 1 FROM participants WHERE id = ?1",
      params![encode_uuid(id)],
      |_| Ok(()),
    )
    .optional()?;
  Ok(found.is_some())
}

pub fn fetch(tx: &Transaction<'_>, id: Uuid) -> Result<Participant> {
  let sql = format!(
    "SELECT {PARTICIPANT_COLUMNS} FROM participants p {PARTICIPANT_JOINS} WHERE p.id = ?1"
  );
  let raw = tx
    .query_row(&sql, params![encode_uuid(id)], |row| RawParticipant::read(row, 0))
    .optional()?
    .ok_or(registro_core::Error::ParticipantNotFound(id))?;
  raw.into_participant()
}

/// Merge `update` into the stored details and rewrite the detail rows.
pub fn update(
  tx: &Transaction<'_>,
  clock: &Clock,
  id: Uuid,
  update: &ParticipantUpdate,
) -> Result<Participant> {
  let current = fetch(tx, id)?;
  let next = current.details.updated(update)?;
  let id_str = encode_uuid(id);

  match &next {
    ParticipantDetails::Company(c) => {
      tx.execute(
        "UPDATE companies SET full_name = ?1, cuit = ?2 WHERE participant_id = ?3",
        params![c.full_name, c.cuit, id_str],
      )?;
    }
    ParticipantDetails::GovernmentOrganism(g) => {
      tx.execute(
        "UPDATE government_organisms SET full_name = ?1, sector = ?2
         WHERE participant_id = ?3",
        params![g.full_name, g.sector, id_str],
      )?;
    }
    ParticipantDetails::NaturalPerson(p) => {
      tx.execute(
        "UPDATE natural_persons SET first_name = ?1, last_name = ?2
         WHERE participant_id = ?3",
        params![p.first_name, p.last_name, id_str],
      )?;
      let id_type: &'static str = p.identification.kind().into();
      tx.execute(
        "UPDATE identifications SET type = ?1, value = ?2
         WHERE person_id = (SELECT id FROM natural_persons WHERE participant_id = ?3)",
        params![id_type, p.identification.value(), id_str],
      )?;
    }
    ParticipantDetails::Academic(a) => {
      let level: &'static str = a.education_level.into();
      tx.execute(
        "UPDATE academics SET full_name = ?1, education_level = ?2
         WHERE participant_id = ?3",
        params![a.full_name, level, id_str],
      )?;
    }
  }

  tx.execute(
    "UPDATE participants SET updated_at = ?1 WHERE id = ?2",
    params![encode_dt(clock.now()), id_str],
  )?;

  Ok(Participant { details: next, ..current })
}

/// Set the verification flag. Verifying twice keeps the first `verified_at`.
pub fn verify(tx: &Transaction<'_>, clock: &Clock, id: Uuid) -> Result<Participant> {
  let now = encode_dt(clock.now());
  let changed = tx.execute(
    "UPDATE participants
     SET is_verified = 1, verified_at = COALESCE(verified_at, ?1), updated_at = ?1
     WHERE id = ?2",
    params![now, encode_uuid(id)],
  )?;
  if changed == 0 {
    return Err(registro_core::Error::ParticipantNotFound(id).into());
  }
  fetch(tx, id)
}

pub fn list(
  tx: &Transaction<'_>,
  query: &ParticipantQuery,
) -> Result<Page<Participant, ParticipantQuery>> {
  let mut filter = Filter::default();
  if let Some(verified) = query.verified {
    filter.push("p.is_verified = ?", [Value::Integer(i64::from(verified))]);
  }
  filter.window("p.created_at", query.window);

  let select = format!("SELECT {PARTICIPANT_COLUMNS} FROM participants p {PARTICIPANT_JOINS}");
  let (sql, values) = filter.finish(&select, "p.created_at", query.sort, query.limit);

  let mut stmt = tx.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(values), |row| RawParticipant::read(row, 0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let results = raws
    .into_iter()
    .map(RawParticipant::into_participant)
    .collect::<Result<Vec<_>>>()?;

  Ok(Page::new(results, query, |p| p.created_at))
}
