use chrono::Utc;
use community_shared::ItemType;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::changes::Table;
use crate::codec::{from_millis, to_millis};
use crate::database::Database;
use crate::error::Result;
use crate::listing::Listing;
use crate::models::Favorite;

const FAVORITE_COLUMNS: &str = "id, user_id, item_id, item_type, item_title,
     item_description, item_image_url, added_at";

impl Favorite {
    /// Snapshot `listing` as a new favorite of `user_id`, added now.
    pub fn snapshot<L: Listing>(user_id: &str, listing: &L) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            item_id: listing.id().to_string(),
            item_type: L::ITEM_TYPE,
            item_title: listing.title().to_string(),
            item_description: listing.description().map(str::to_string),
            item_image_url: listing.primary_image().map(str::to_string),
            added_at: Utc::now(),
        }
    }
}

impl Database {
    /// Insert a favorite, or refresh the snapshot of the existing row for the
    /// same `(user_id, item_id, item_type)`.  The existing row keeps its id.
    pub fn upsert_favorite(&self, favorite: &Favorite) -> Result<()> {
        self.conn().execute(
            &format!(
                "INSERT INTO user_favorites ({FAVORITE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(user_id, item_id, item_type) DO UPDATE SET
                    item_title       = excluded.item_title,
                    item_description = excluded.item_description,
                    item_image_url   = excluded.item_image_url,
                    added_at         = excluded.added_at"
            ),
            params![
                favorite.id,
                favorite.user_id,
                favorite.item_id,
                favorite.item_type.as_str(),
                favorite.item_title,
                favorite.item_description,
                favorite.item_image_url,
                to_millis(favorite.added_at),
            ],
        )?;
        self.notify(Table::Favorites);
        Ok(())
    }

    pub fn is_favorite(&self, user_id: &str, item_id: &str, item_type: ItemType) -> Result<bool> {
        let exists: bool = self.conn().query_row(
            "SELECT EXISTS(
                SELECT 1 FROM user_favorites
                WHERE user_id = ?1 AND item_id = ?2 AND item_type = ?3
             )",
            params![user_id, item_id, item_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn get_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        item_type: ItemType,
    ) -> Result<Option<Favorite>> {
        let favorite = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {FAVORITE_COLUMNS} FROM user_favorites
                     WHERE user_id = ?1 AND item_id = ?2 AND item_type = ?3"
                ),
                params![user_id, item_id, item_type.as_str()],
                row_to_favorite,
            )
            .optional()?;
        Ok(favorite)
    }

    /// Every favorite of `user_id`, most recently added first.
    pub fn list_favorites(&self, user_id: &str) -> Result<Vec<Favorite>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM user_favorites
             WHERE user_id = ?1
             ORDER BY added_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_favorite)?;

        let mut favorites = Vec::new();
        for row in rows {
            favorites.push(row?);
        }
        Ok(favorites)
    }

    pub fn list_favorites_by_type(
        &self,
        user_id: &str,
        item_type: ItemType,
    ) -> Result<Vec<Favorite>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM user_favorites
             WHERE user_id = ?1 AND item_type = ?2
             ORDER BY added_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![user_id, item_type.as_str()], row_to_favorite)?;

        let mut favorites = Vec::new();
        for row in rows {
            favorites.push(row?);
        }
        Ok(favorites)
    }

    /// Returns `true` if a row was deleted.
    pub fn delete_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        item_type: ItemType,
    ) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM user_favorites WHERE user_id = ?1 AND item_id = ?2 AND item_type = ?3",
            params![user_id, item_id, item_type.as_str()],
        )?;
        if affected > 0 {
            self.notify(Table::Favorites);
        }
        Ok(affected > 0)
    }

    pub fn delete_favorites_for_user(&self, user_id: &str) -> Result<usize> {
        let affected = self
            .conn()
            .execute("DELETE FROM user_favorites WHERE user_id = ?1", params![user_id])?;
        if affected > 0 {
            self.notify(Table::Favorites);
        }
        Ok(affected)
    }

    pub fn count_favorites(&self, user_id: &str) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM user_favorites WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn row_to_favorite(row: &rusqlite::Row<'_>) -> rusqlite::Result<Favorite> {
    let type_str: String = row.get(3)?;
    let added_millis: i64 = row.get(7)?;

    let item_type = ItemType::parse(&type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown item type: {type_str}").into(),
        )
    })?;

    Ok(Favorite {
        id: row.get(0)?,
        user_id: row.get(1)?,
        item_id: row.get(2)?,
        item_type,
        item_title: row.get(4)?,
        item_description: row.get(5)?,
        item_image_url: row.get(6)?,
        added_at: from_millis(7, added_millis)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::Restaurant;

    fn pizza() -> Restaurant {
        serde_json::from_value(serde_json::json!({
            "id": "r1",
            "name": "Pizza Palace",
            "description": "Wood fired",
            "images": ["a.jpg"],
        }))
        .unwrap()
    }

    #[test]
    fn snapshot_copies_listing_fields() {
        let fav = Favorite::snapshot("u1", &pizza());
        assert_eq!(fav.item_type, ItemType::Restaurant);
        assert_eq!(fav.item_title, "Pizza Palace");
        assert_eq!(fav.item_description.as_deref(), Some("Wood fired"));
        assert_eq!(fav.item_image_url.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn upsert_is_unique_per_triple() {
        let db = Database::open_in_memory().unwrap();
        let first = Favorite::snapshot("u1", &pizza());
        db.upsert_favorite(&first).unwrap();

        let mut again = Favorite::snapshot("u1", &pizza());
        again.item_title = "Pizza Palace (new)".into();
        db.upsert_favorite(&again).unwrap();

        let all = db.list_favorites("u1").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[0].item_title, "Pizza Palace (new)");

        // Same item id under another domain is a distinct favorite.
        let mut cafe = Favorite::snapshot("u1", &pizza());
        cafe.item_type = ItemType::Cafe;
        db.upsert_favorite(&cafe).unwrap();
        assert_eq!(db.count_favorites("u1").unwrap(), 2);
    }

    #[test]
    fn add_then_remove_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_favorite(&Favorite::snapshot("u1", &pizza())).unwrap();
        assert!(db.is_favorite("u1", "r1", ItemType::Restaurant).unwrap());
        assert!(!db.is_favorite("u2", "r1", ItemType::Restaurant).unwrap());

        assert!(db.delete_favorite("u1", "r1", ItemType::Restaurant).unwrap());
        assert!(!db.is_favorite("u1", "r1", ItemType::Restaurant).unwrap());
        assert!(db.get_favorite("u1", "r1", ItemType::Restaurant).unwrap().is_none());
    }

    #[test]
    fn listing_is_newest_first_and_filterable() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        for (i, item) in ["a", "b", "c"].into_iter().enumerate() {
            let mut fav = Favorite::snapshot("u1", &pizza());
            fav.item_id = item.into();
            fav.added_at = now - Duration::minutes(10 - i as i64);
            db.upsert_favorite(&fav).unwrap();
        }
        let mut cafe = Favorite::snapshot("u1", &pizza());
        cafe.item_type = ItemType::Cafe;
        cafe.item_id = "z".into();
        cafe.added_at = now - Duration::hours(1);
        db.upsert_favorite(&cafe).unwrap();

        let items: Vec<_> = db
            .list_favorites_by_type("u1", ItemType::Restaurant)
            .unwrap()
            .into_iter()
            .map(|f| f.item_id)
            .collect();
        assert_eq!(items, vec!["c", "b", "a"]);
        assert_eq!(db.list_favorites("u1").unwrap().len(), 4);

        assert_eq!(db.delete_favorites_for_user("u1").unwrap(), 4);
        assert_eq!(db.count_favorites("u1").unwrap(), 0);
    }
}
