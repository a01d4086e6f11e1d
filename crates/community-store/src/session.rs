//! The single persisted session row.

use rusqlite::{params, OptionalExtension};

use crate::changes::Table;
use crate::codec::from_json;
use crate::database::Database;
use crate::error::Result;
use crate::models::StoredSession;

impl Database {
    /// The persisted session, or the empty default if none was saved.
    pub fn load_session(&self) -> Result<StoredSession> {
        let session = self
            .conn()
            .query_row("SELECT json FROM session WHERE id = 1", [], |row| {
                let json: String = row.get(0)?;
                from_json(0, &json)
            })
            .optional()?;
        Ok(session.unwrap_or_default())
    }

    pub fn save_session(&self, session: &StoredSession) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.conn().execute(
            "INSERT INTO session (id, json) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET json = excluded.json",
            params![json],
        )?;
        self.notify(Table::Session);
        Ok(())
    }

    pub fn clear_session(&self) -> Result<()> {
        self.conn().execute("DELETE FROM session", [])?;
        self.notify(Table::Session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_loads_default() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_session().unwrap(), StoredSession::default());
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        let session = StoredSession {
            auth_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            user_id: Some("u1".into()),
            expires_in: Some(3600),
        };
        Database::open_at(&path).unwrap().save_session(&session).unwrap();

        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.load_session().unwrap(), session);

        db.clear_session().unwrap();
        assert_eq!(db.load_session().unwrap(), StoredSession::default());
    }

    #[test]
    fn writes_bump_the_session_version() {
        let db = Database::open_in_memory().unwrap();
        let before = db.changes().version(Table::Session);

        db.save_session(&StoredSession::default()).unwrap();
        db.clear_session().unwrap();

        assert_eq!(db.changes().version(Table::Session), before + 2);
    }
}
