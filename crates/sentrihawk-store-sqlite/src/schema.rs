//! SQL schema for the SentriHawk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- `seq` preserves creation order; visitors are never deleted.
CREATE TABLE IF NOT EXISTS visitors (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    visitor_id     TEXT NOT NULL UNIQUE,
    created_at     TEXT NOT NULL,   -- RFC 3339 UTC
    name           TEXT NOT NULL,
    document_id    TEXT,
    phone          TEXT,
    company        TEXT,
    vrn            TEXT,
    destination    TEXT,            -- owning tenant; isolation key
    status         TEXT NOT NULL,   -- 'EXPECTED' | 'ON_SITE' | 'CHECKED_OUT' | 'RESTRICTED'
    is_blacklisted INTEGER NOT NULL DEFAULT 0,
    is_ghost       INTEGER NOT NULL DEFAULT 0,
    is_vip         INTEGER NOT NULL DEFAULT 0
);

-- Rewritten per visitor on every mutation, in the same transaction as the
-- visitors row.
CREATE TABLE IF NOT EXISTS visits (
    visit_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    visitor_id  TEXT NOT NULL REFERENCES visitors(visitor_id),
    position    INTEGER NOT NULL,
    date        TEXT NOT NULL,      -- YYYY-MM-DD
    destination TEXT NOT NULL,
    time_in     TEXT,               -- HH:MM:SS
    time_out    TEXT,
    UNIQUE (visitor_id, position)
);

CREATE TABLE IF NOT EXISTS packages (
    seq              INTEGER PRIMARY KEY AUTOINCREMENT,
    package_id       TEXT NOT NULL UNIQUE,
    courier          TEXT NOT NULL,
    details          TEXT NOT NULL,
    destination      TEXT NOT NULL,
    logged_at        TEXT NOT NULL,
    collected_by     TEXT,
    collected_tenant TEXT,
    collected_at     TEXT
);

CREATE INDEX IF NOT EXISTS visitors_destination_idx ON visitors(destination);
CREATE INDEX IF NOT EXISTS visitors_document_idx    ON visitors(document_id);
CREATE INDEX IF NOT EXISTS visits_date_idx          ON visits(date);

PRAGMA user_version = 1;
";
