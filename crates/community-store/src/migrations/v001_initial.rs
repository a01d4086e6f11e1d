//! v001 -- Initial schema creation.
//!
//! Six listing cache tables with a shared layout, the cached user table, the
//! favorites and search-history ledgers, and the single-row session table.

use rusqlite::Connection;

use crate::changes::Table;

/// Listing tables keep the entity as JSON plus the derived columns used for
/// ordering, filtering and search.
fn listing_table_sql(name: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {name} (
    id           TEXT PRIMARY KEY NOT NULL,
    title        TEXT NOT NULL,               -- name or title
    search_field TEXT,                        -- secondary search column
    city         TEXT,
    category     TEXT,
    rating       REAL,
    latitude     REAL,
    longitude    REAL,
    payload      TEXT NOT NULL,               -- JSON-encoded entity
    cached_at    INTEGER NOT NULL             -- unix millis of last write
);

CREATE INDEX IF NOT EXISTS idx_{name}_title ON {name}(title);
CREATE INDEX IF NOT EXISTS idx_{name}_cached_at ON {name}(cached_at);
"#
    )
}

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS cached_users (
    id                TEXT PRIMARY KEY NOT NULL,
    email             TEXT NOT NULL,
    name              TEXT,
    phone             TEXT,
    avatar_url        TEXT,
    bio               TEXT,
    location          TEXT,
    is_email_verified INTEGER NOT NULL DEFAULT 0,   -- boolean 0/1
    is_phone_verified INTEGER NOT NULL DEFAULT 0,   -- boolean 0/1
    created_at        TEXT,                         -- as sent by the API
    updated_at        TEXT,
    cached_at         INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cached_users_email ON cached_users(email);

-- ----------------------------------------------------------------
-- Favorites ledger
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS user_favorites (
    id               TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    user_id          TEXT NOT NULL,
    item_id          TEXT NOT NULL,
    item_type        TEXT NOT NULL,                 -- restaurant, cafe, ...
    item_title       TEXT NOT NULL,
    item_description TEXT,
    item_image_url   TEXT,
    added_at         INTEGER NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_user_favorites_unique
    ON user_favorites(user_id, item_id, item_type);
CREATE INDEX IF NOT EXISTS idx_user_favorites_user_added
    ON user_favorites(user_id, added_at DESC);

-- ----------------------------------------------------------------
-- Search history
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS search_history (
    id           TEXT PRIMARY KEY NOT NULL,         -- UUID v4
    query        TEXT NOT NULL,
    category     TEXT,                              -- NULL for global search
    result_count INTEGER,
    searched_at  INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_search_history_searched_at
    ON search_history(searched_at DESC);

-- ----------------------------------------------------------------
-- Session
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS session (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    json TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    let tx = conn.unchecked_transaction()?;
    for table in Table::LISTINGS {
        tx.execute_batch(&listing_table_sql(table.name()))?;
    }
    tx.execute_batch(UP_SQL)?;
    tx.commit()
}
