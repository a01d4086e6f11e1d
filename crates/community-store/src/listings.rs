//! CRUD operations for the six listing cache tables.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::codec::{contains_pattern, from_json, from_millis, to_millis};
use crate::database::Database;
use crate::error::Result;
use crate::listing::{Filter, Listing};

const COLUMNS: &str = "payload, cached_at";

impl Database {
    // ------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------

    /// Insert or replace a listing, stamping `cached_at` with the current time.
    pub fn upsert_listing<L: Listing>(&self, listing: &L) -> Result<()> {
        self.upsert_listing_at(listing, Utc::now())
    }

    /// Insert or replace a listing with an explicit `cached_at`.
    pub fn upsert_listing_at<L: Listing>(
        &self,
        listing: &L,
        cached_at: DateTime<Utc>,
    ) -> Result<()> {
        write_listing(self, listing, cached_at)?;
        self.notify(L::table());
        Ok(())
    }

    /// Insert or replace many listings in a single transaction.
    pub fn upsert_listings<L: Listing>(&self, listings: &[L]) -> Result<()> {
        let now = Utc::now();
        let tx = self.conn().unchecked_transaction()?;
        for listing in listings {
            write_listing(self, listing, now)?;
        }
        tx.commit()?;
        self.notify(L::table());
        Ok(())
    }

    /// Delete every row of the table and insert `listings`, atomically.
    ///
    /// If any insert fails the transaction rolls back and the previous
    /// contents stay in place.
    pub fn replace_listings<L: Listing>(&self, listings: &[L]) -> Result<()> {
        let now = Utc::now();
        let tx = self.conn().unchecked_transaction()?;
        tx.execute(&format!("DELETE FROM {}", L::table().name()), [])?;
        for listing in listings {
            write_listing(self, listing, now)?;
        }
        tx.commit()?;
        self.notify(L::table());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_listing<L: Listing>(&self, id: &str) -> Result<Option<L>> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = ?1", L::table().name());
        let listing = self
            .conn()
            .query_row(&sql, params![id], row_to_listing::<L>)
            .optional()?;
        Ok(listing)
    }

    /// All rows ordered by title ascending.
    pub fn list_listings<L: Listing>(&self) -> Result<Vec<L>> {
        self.select_listings(
            &format!(
                "SELECT {COLUMNS} FROM {} ORDER BY title COLLATE NOCASE ASC, id ASC",
                L::table().name()
            ),
            params![],
        )
    }

    /// The first `limit` rows in title order.
    pub fn list_listings_limited<L: Listing>(&self, limit: u32) -> Result<Vec<L>> {
        self.select_listings(
            &format!(
                "SELECT {COLUMNS} FROM {} ORDER BY title COLLATE NOCASE ASC, id ASC LIMIT ?1",
                L::table().name()
            ),
            params![limit],
        )
    }

    /// Rows whose filter column equals the value, best rated first.
    pub fn query_listings_by_field<L: Listing>(&self, filter: &Filter) -> Result<Vec<L>> {
        self.select_listings(
            &format!(
                "SELECT {COLUMNS} FROM {table}
                 WHERE {column} = ?1
                 ORDER BY rating IS NULL, rating DESC, title COLLATE NOCASE ASC",
                table = L::table().name(),
                column = filter.column(),
            ),
            params![filter.value()],
        )
    }

    /// Case-insensitive substring match over title and the secondary search
    /// column, in title order.
    pub fn search_listings<L: Listing>(&self, query: &str) -> Result<Vec<L>> {
        self.select_listings(
            &format!(
                "SELECT {COLUMNS} FROM {}
                 WHERE title LIKE ?1 ESCAPE '\\' OR search_field LIKE ?1 ESCAPE '\\'
                 ORDER BY title COLLATE NOCASE ASC, id ASC",
                L::table().name()
            ),
            params![contains_pattern(query)],
        )
    }

    pub fn count_listings<L: Listing>(&self) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM {}", L::table().name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Returns `true` if a row was deleted.
    pub fn delete_listing<L: Listing>(&self, id: &str) -> Result<bool> {
        let affected = self.conn().execute(
            &format!("DELETE FROM {} WHERE id = ?1", L::table().name()),
            params![id],
        )?;
        if affected > 0 {
            self.notify(L::table());
        }
        Ok(affected > 0)
    }

    pub fn delete_all_listings<L: Listing>(&self) -> Result<usize> {
        let affected = self
            .conn()
            .execute(&format!("DELETE FROM {}", L::table().name()), [])?;
        self.notify(L::table());
        Ok(affected)
    }

    /// Evict rows last written before `cutoff`.  Returns the number removed.
    pub fn delete_listings_older_than<L: Listing>(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let affected = self.conn().execute(
            &format!("DELETE FROM {} WHERE cached_at < ?1", L::table().name()),
            params![to_millis(cutoff)],
        )?;
        if affected > 0 {
            self.notify(L::table());
        }
        Ok(affected)
    }

    fn select_listings<L: Listing>(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<L>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params, row_to_listing::<L>)?;

        let mut listings = Vec::new();
        for row in rows {
            listings.push(row?);
        }
        Ok(listings)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_listing<L: Listing>(db: &Database, listing: &L, cached_at: DateTime<Utc>) -> Result<()> {
    let payload = serde_json::to_string(listing)?;
    let (latitude, longitude) = listing.coordinates().unzip();

    db.conn().execute(
        &format!(
            "INSERT OR REPLACE INTO {}
                (id, title, search_field, city, category, rating,
                 latitude, longitude, payload, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            L::table().name()
        ),
        params![
            listing.id(),
            listing.title(),
            listing.search_field(),
            listing.city(),
            listing.category(),
            listing.rating(),
            latitude,
            longitude,
            payload,
            to_millis(cached_at),
        ],
    )?;
    Ok(())
}

/// Map a `rusqlite::Row` of `(payload, cached_at)` to a listing.
fn row_to_listing<L: Listing>(row: &rusqlite::Row<'_>) -> rusqlite::Result<L> {
    let payload: String = row.get(0)?;
    let cached_millis: i64 = row.get(1)?;

    let mut listing: L = from_json(0, &payload)?;
    listing.set_cached_at(from_millis(1, cached_millis)?);
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::{Job, Restaurant};

    fn restaurant(
        id: &str,
        name: &str,
        cuisine: &str,
        city: &str,
        rating: Option<f64>,
    ) -> Restaurant {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "cuisine": cuisine,
            "city": city,
            "rating": rating,
        }))
        .unwrap()
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.upsert_listings(&[
            restaurant("1", "Pizza Palace", "Italian", "Toronto", Some(4.1)),
            restaurant("2", "Sushi Go", "Japanese", "Toronto", Some(4.8)),
            restaurant("3", "burger barn", "American", "Ottawa", None),
        ])
        .unwrap();
        db
    }

    fn ids<L: Listing>(rows: &[L]) -> Vec<&str> {
        rows.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn get_by_id_hit_and_miss() {
        let db = seeded();
        let hit: Option<Restaurant> = db.get_listing("2").unwrap();
        assert_eq!(hit.unwrap().name, "Sushi Go");
        assert!(db.get_listing::<Restaurant>("404").unwrap().is_none());
        // Tables are per domain.
        assert!(db.get_listing::<Job>("2").unwrap().is_none());
    }

    #[test]
    fn list_is_title_ordered_case_insensitively() {
        let db = seeded();
        let all: Vec<Restaurant> = db.list_listings().unwrap();
        assert_eq!(ids(&all), vec!["3", "1", "2"]);

        let first_two: Vec<Restaurant> = db.list_listings_limited(2).unwrap();
        assert_eq!(ids(&first_two), vec!["3", "1"]);
    }

    #[test]
    fn filter_orders_by_rating_with_unrated_last() {
        let db = seeded();
        db.upsert_listing(&restaurant("4", "Ramen Bar", "Japanese", "Toronto", None))
            .unwrap();

        let toronto: Vec<Restaurant> = db
            .query_listings_by_field(&Filter::City("Toronto".into()))
            .unwrap();
        assert_eq!(ids(&toronto), vec!["2", "1", "4"]);

        let japanese: Vec<Restaurant> = db
            .query_listings_by_field(&Filter::Category("Japanese".into()))
            .unwrap();
        assert_eq!(ids(&japanese), vec!["2", "4"]);
    }

    #[test]
    fn search_is_case_insensitive_and_unanchored() {
        let db = seeded();
        for query in ["pizza", "PALACE", "za pa"] {
            let found: Vec<Restaurant> = db.search_listings(query).unwrap();
            assert_eq!(ids(&found), vec!["1"], "query {query:?}");
        }

        // Secondary column.
        let found: Vec<Restaurant> = db.search_listings("japan").unwrap();
        assert_eq!(ids(&found), vec!["2"]);

        // Wildcards are literal.
        let found: Vec<Restaurant> = db.search_listings("%").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn upsert_replaces_and_stamps_cached_at() {
        let db = seeded();
        let old = Utc::now() - Duration::hours(48);
        db.upsert_listing_at(&restaurant("1", "Pizza Palace II", "Italian", "Toronto", None), old)
            .unwrap();

        let row: Restaurant = db.get_listing("1").unwrap().unwrap();
        assert_eq!(row.name, "Pizza Palace II");
        assert_eq!(row.cached_at.timestamp_millis(), old.timestamp_millis());
        assert_eq!(db.count_listings::<Restaurant>().unwrap(), 3);
    }

    #[test]
    fn replace_swaps_whole_table() {
        let db = seeded();
        db.replace_listings(&[
            restaurant("2", "Sushi Go", "Japanese", "Toronto", Some(4.8)),
            restaurant("9", "Taco Stand", "Mexican", "Ottawa", None),
        ])
        .unwrap();

        let all: Vec<Restaurant> = db.list_listings().unwrap();
        assert_eq!(ids(&all), vec!["2", "9"]);
    }

    #[test]
    fn delete_variants() {
        let db = seeded();
        assert!(db.delete_listing::<Restaurant>("1").unwrap());
        assert!(!db.delete_listing::<Restaurant>("1").unwrap());

        let cutoff = Utc::now() - Duration::hours(24);
        let old = restaurant("5", "Old Diner", "American", "Ottawa", None);
        db.upsert_listing_at(&old, cutoff - Duration::hours(1)).unwrap();
        assert_eq!(db.delete_listings_older_than::<Restaurant>(cutoff).unwrap(), 1);
        assert_eq!(db.count_listings::<Restaurant>().unwrap(), 2);

        assert_eq!(db.delete_all_listings::<Restaurant>().unwrap(), 2);
        assert_eq!(db.count_listings::<Restaurant>().unwrap(), 0);
    }

    #[test]
    fn writes_notify_the_table() {
        let db = Database::open_in_memory().unwrap();
        let mut rx = db.changes().subscribe(Restaurant::table());
        db.upsert_listing(&restaurant("1", "A", "B", "C", None)).unwrap();
        assert!(rx.has_changed().unwrap());
    }
}
