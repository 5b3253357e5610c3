//! SQL schema for the Tandem SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema version for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- `seq` is the registration order the selector scans in.
CREATE TABLE IF NOT EXISTS candidates (
    seq           INTEGER PRIMARY KEY,
    candidate_id  TEXT NOT NULL UNIQUE,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL COLLATE NOCASE UNIQUE,
    phone         TEXT NOT NULL,
    credential    TEXT NOT NULL,   -- opaque, e.g. argon2 PHC string
    skills        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organizations (
    seq              INTEGER PRIMARY KEY,
    organization_id  TEXT NOT NULL UNIQUE,
    created_at       TEXT NOT NULL,
    name             TEXT NOT NULL,
    email            TEXT NOT NULL COLLATE NOCASE UNIQUE,
    phone            TEXT NOT NULL,
    credential       TEXT NOT NULL,
    description      TEXT NOT NULL
);

-- Skips are append-only; a repeated skip hits the primary key and is ignored.
CREATE TABLE IF NOT EXISTS skips (
    viewer_side  TEXT NOT NULL,   -- 'candidate' | 'organization'
    viewer_id    TEXT NOT NULL,
    subject_id   TEXT NOT NULL,
    recorded_at  TEXT NOT NULL,
    PRIMARY KEY (viewer_side, viewer_id, subject_id)
);

-- Matches are never updated or deleted. One row per pair at most.
CREATE TABLE IF NOT EXISTS matches (
    match_id         TEXT PRIMARY KEY,
    candidate_id     TEXT NOT NULL REFERENCES candidates(candidate_id),
    organization_id  TEXT NOT NULL REFERENCES organizations(organization_id),
    created_at       TEXT NOT NULL,
    UNIQUE (candidate_id, organization_id)
);

CREATE INDEX IF NOT EXISTS matches_organization_idx ON matches(organization_id);

PRAGMA user_version = 1;
";
