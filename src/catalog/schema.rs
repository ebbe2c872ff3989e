use rusqlite::Connection;

/// Tables are created idempotently on every open.
///
/// `photos.id` is the number parsed from the file name, not a rowid
/// allocated by SQLite, so rescans keep ids (and the likes hanging off them)
/// stable.
pub(super) const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS categories (
    id              INTEGER PRIMARY KEY,
    name            TEXT NOT NULL UNIQUE,
    description     TEXT,
    display_order   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS photos (
    id              INTEGER PRIMARY KEY,
    title           TEXT NOT NULL,
    description     TEXT,
    category        TEXT NOT NULL,
    folder          TEXT NOT NULL,
    image_url       TEXT NOT NULL,
    thumbnail_url   TEXT,
    display_order   INTEGER NOT NULL DEFAULT 0,
    metadata        TEXT
);

CREATE INDEX IF NOT EXISTS idx_photos_category
    ON photos(category, id);

CREATE TABLE IF NOT EXISTS photo_likes (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    photo_id        INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
    fingerprint     TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    UNIQUE(photo_id, fingerprint)
);

CREATE TABLE IF NOT EXISTS photo_recommendations (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    photo_id                INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
    recommended_photo_id    INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
    created_at              TEXT NOT NULL,
    UNIQUE(photo_id, recommended_photo_id)
);
"#;

pub(super) fn initialize(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
