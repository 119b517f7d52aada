//! SQL schema for the Registro SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 UTC strings with microseconds, so
/// text comparison orders them chronologically.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS participants (
    id          TEXT PRIMARY KEY,
    type        TEXT NOT NULL,   -- NATURAL_PERSON | GOVERNMENT_ORGANISM | COMPANY | ACADEMIC
    is_verified INTEGER NOT NULL DEFAULT 0,
    verified_at TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Exactly one of the four detail tables holds a row per participant,
-- selected by participants.type.
CREATE TABLE IF NOT EXISTS companies (
    id             TEXT PRIMARY KEY,
    participant_id TEXT NOT NULL UNIQUE REFERENCES participants(id),
    full_name      TEXT NOT NULL,
    cuit           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS government_organisms (
    id             TEXT PRIMARY KEY,
    participant_id TEXT NOT NULL UNIQUE REFERENCES participants(id),
    full_name      TEXT NOT NULL,
    sector         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS natural_persons (
    id             TEXT PRIMARY KEY,
    participant_id TEXT NOT NULL UNIQUE REFERENCES participants(id),
    first_name     TEXT NOT NULL,
    last_name      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS identifications (
    id        TEXT PRIMARY KEY,
    person_id TEXT NOT NULL UNIQUE REFERENCES natural_persons(id),
    type      TEXT NOT NULL,   -- DNI | CUIT | LE
    value     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS academics (
    id              TEXT PRIMARY KEY,
    participant_id  TEXT NOT NULL UNIQUE REFERENCES participants(id),
    full_name       TEXT NOT NULL,
    education_level TEXT NOT NULL   -- SCHOOL | HIGHSCHOOL | UNIVERSITY
);

CREATE TABLE IF NOT EXISTS ethereum_accounts (
    id         TEXT PRIMARY KEY,
    public_key TEXT NOT NULL UNIQUE,
    balance    INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
    created_at TEXT NOT NULL
);

-- Written once with the account; never updated.
CREATE TABLE IF NOT EXISTS balance_limits (
    id         TEXT PRIMARY KEY,
    address_id TEXT NOT NULL UNIQUE REFERENCES ethereum_accounts(id),
    amount     INTEGER NOT NULL CHECK (amount >= 0),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS account_controllers (
    id             TEXT PRIMARY KEY,
    address_id     TEXT NOT NULL REFERENCES ethereum_accounts(id),
    participant_id TEXT NOT NULL REFERENCES participants(id),
    created_at     TEXT NOT NULL,
    UNIQUE (address_id, participant_id)
);

-- Status histories are strictly append-only.
-- No UPDATE or DELETE is ever issued against these tables.
CREATE TABLE IF NOT EXISTS account_controller_statuses (
    id            TEXT PRIMARY KEY,
    controller_id TEXT NOT NULL REFERENCES account_controllers(id),
    status        TEXT NOT NULL,   -- UNVERIFIED | VERIFIED | TO_REVERIFIED | REJECTED
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recharges (
    id         TEXT PRIMARY KEY,
    address_id TEXT NOT NULL REFERENCES ethereum_accounts(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recharge_statuses (
    id          TEXT PRIMARY KEY,
    recharge_id TEXT NOT NULL REFERENCES recharges(id),
    status      TEXT NOT NULL,   -- WAITING | SATISFIED | REJECTED
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS customers (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS participants_created_idx  ON participants(created_at);
CREATE INDEX IF NOT EXISTS accounts_created_idx      ON ethereum_accounts(created_at);
CREATE INDEX IF NOT EXISTS controllers_participant_idx ON account_controllers(participant_id);
CREATE INDEX IF NOT EXISTS controller_statuses_idx   ON account_controller_statuses(controller_id, created_at);
CREATE INDEX IF NOT EXISTS recharges_created_idx     ON recharges(created_at);
CREATE INDEX IF NOT EXISTS recharge_statuses_idx     ON recharge_statuses(recharge_id, created_at);
CREATE INDEX IF NOT EXISTS customers_created_idx     ON customers(created_at);

PRAGMA user_version = 1;
";
