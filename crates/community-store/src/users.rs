use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::changes::Table;
use crate::codec::{from_millis, to_millis};
use crate::database::Database;
use crate::error::Result;
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, phone, avatar_url, bio, location,
     is_email_verified, is_phone_verified, created_at, updated_at, cached_at";

impl Database {
    /// Insert or replace the cached copy of a user, stamping `cached_at`.
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            &format!(
                "INSERT OR REPLACE INTO cached_users ({USER_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                user.id,
                user.email,
                user.name,
                user.phone,
                user.avatar_url,
                user.bio,
                user.location,
                user.is_email_verified,
                user.is_phone_verified,
                user.created_at,
                user.updated_at,
                to_millis(Utc::now()),
            ],
        )?;
        self.notify(Table::Users);
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM cached_users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {USER_COLUMNS} FROM cached_users
                     WHERE email = ?1 COLLATE NOCASE
                     ORDER BY cached_at DESC LIMIT 1"
                ),
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn delete_user(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM cached_users WHERE id = ?1", params![id])?;
        if affected > 0 {
            self.notify(Table::Users);
        }
        Ok(affected > 0)
    }

    pub fn delete_all_users(&self) -> Result<usize> {
        let affected = self.conn().execute("DELETE FROM cached_users", [])?;
        self.notify(Table::Users);
        Ok(affected)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let cached_millis: i64 = row.get(11)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        avatar_url: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        is_email_verified: row.get(7)?,
        is_phone_verified: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        cached_at: from_millis(11, cached_millis)?,
    })
}
