pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS trips (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL,
    budget      TEXT NOT NULL DEFAULT '0',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    date         TEXT NOT NULL,
    amount       TEXT NOT NULL,
    kind         TEXT NOT NULL DEFAULT 'despesa',
    category     TEXT NOT NULL DEFAULT 'outros',
    description  TEXT NOT NULL,
    trip_id      INTEGER REFERENCES trips(id) ON DELETE SET NULL,
    currency     TEXT NOT NULL DEFAULT 'EUR',
    source       TEXT NOT NULL DEFAULT 'manual',
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category);
CREATE INDEX IF NOT EXISTS idx_transactions_trip ON transactions(trip_id);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

