use community_shared::ItemType;
use rusqlite::params;

use crate::changes::Table;
use crate::codec::{contains_pattern, from_millis, to_millis};
use crate::database::Database;
use crate::error::Result;
use crate::models::SearchHistoryEntry;

impl Database {
    /// Append an entry.  Queries are not deduplicated.
    pub fn insert_search(&self, entry: &SearchHistoryEntry) -> Result<()> {
        self.conn().execute(
            "INSERT INTO search_history (id, query, category, result_count, searched_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id,
                entry.query,
                entry.category.map(|c| c.as_str()),
                entry.result_count,
                to_millis(entry.searched_at),
            ],
        )?;
        self.notify(Table::SearchHistory);
        Ok(())
    }

    /// The `limit` most recent entries, newest first.
    pub fn recent_searches(&self, limit: u32) -> Result<Vec<SearchHistoryEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, query, category, result_count, searched_at
             FROM search_history
             ORDER BY searched_at DESC, rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Distinct past queries containing `fragment`, most recently used first.
    pub fn search_suggestions(&self, fragment: &str, limit: u32) -> Result<Vec<String>> {
        let mut stmt = self.conn().prepare(
            "SELECT query FROM search_history
             WHERE query LIKE ?1 ESCAPE '\\'
             GROUP BY query
             ORDER BY MAX(searched_at) DESC, MAX(rowid) DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![contains_pattern(fragment), limit], |row| row.get(0))?;

        let mut queries = Vec::new();
        for row in rows {
            queries.push(row?);
        }
        Ok(queries)
    }

    pub fn delete_search(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM search_history WHERE id = ?1", params![id])?;
        if affected > 0 {
            self.notify(Table::SearchHistory);
        }
        Ok(affected > 0)
    }

    pub fn delete_all_searches(&self) -> Result<usize> {
        let affected = self.conn().execute("DELETE FROM search_history", [])?;
        self.notify(Table::SearchHistory);
        Ok(affected)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchHistoryEntry> {
    let category: Option<String> = row.get(2)?;
    let searched_millis: i64 = row.get(4)?;

    Ok(SearchHistoryEntry {
        id: row.get(0)?,
        query: row.get(1)?,
        // Unknown categories written by a newer schema read back as global.
        category: category.as_deref().and_then(ItemType::parse),
        result_count: row.get(3)?,
        searched_at: from_millis(4, searched_millis)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn entry(query: &str, at: DateTime<Utc>) -> SearchHistoryEntry {
        SearchHistoryEntry {
            id: Uuid::new_v4().to_string(),
            query: query.to_string(),
            category: Some(ItemType::Restaurant),
            result_count: Some(3),
            searched_at: at,
        }
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.insert_search(&entry("pizza", now - Duration::minutes(3))).unwrap();
        db.insert_search(&entry("sushi", now - Duration::minutes(2))).unwrap();
        db.insert_search(&entry("tacos", now - Duration::minutes(1))).unwrap();

        let recent: Vec<_> = db
            .recent_searches(2)
            .unwrap()
            .into_iter()
            .map(|e| e.query)
            .collect();
        assert_eq!(recent, vec!["tacos", "sushi"]);
    }

    #[test]
    fn same_timestamp_keeps_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.insert_search(&entry("first", now)).unwrap();
        db.insert_search(&entry("second", now)).unwrap();

        let recent = db.recent_searches(20).unwrap();
        assert_eq!(recent[0].query, "second");
        assert_eq!(recent[0].category, Some(ItemType::Restaurant));
        assert_eq!(recent[0].result_count, Some(3));
    }

    #[test]
    fn suggestions_are_distinct_and_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.insert_search(&entry("Pizza Palace", now - Duration::minutes(5))).unwrap();
        db.insert_search(&entry("pizza near me", now - Duration::minutes(4))).unwrap();
        db.insert_search(&entry("Pizza Palace", now - Duration::minutes(1))).unwrap();
        db.insert_search(&entry("sushi", now)).unwrap();

        let suggestions = db.search_suggestions("PIZZA", 10).unwrap();
        assert_eq!(suggestions, vec!["Pizza Palace", "pizza near me"]);

        assert_eq!(db.search_suggestions("pizza", 1).unwrap().len(), 1);
    }

    #[test]
    fn delete_one_and_all() {
        let db = Database::open_in_memory().unwrap();
        let e = entry("pizza", Utc::now());
        db.insert_search(&e).unwrap();
        db.insert_search(&entry("sushi", Utc::now())).unwrap();

        assert!(db.delete_search(&e.id).unwrap());
        assert_eq!(db.recent_searches(20).unwrap().len(), 1);
        assert_eq!(db.delete_all_searches().unwrap(), 1);
    }
}
