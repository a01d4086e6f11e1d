use chrono::Utc;
use community_shared::constants::{RECENT_SEARCH_LIMIT, SUGGESTION_LIMIT};
use community_shared::ItemType;
use community_store::{LiveQuery, LocalStore, SearchHistoryEntry, Table};
use uuid::Uuid;

use crate::error::{DataError, Result};

/// Append-only log of past searches.
#[derive(Clone)]
pub struct SearchHistoryLedger {
    store: LocalStore,
}

impl SearchHistoryLedger {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Append a search.  Blank queries are rejected before touching the
    /// store.
    pub fn record(
        &self,
        query: &str,
        category: Option<ItemType>,
        result_count: Option<u32>,
    ) -> Result<SearchHistoryEntry> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DataError::Validation(vec!["Search query is required".to_string()]));
        }

        let entry = SearchHistoryEntry {
            id: Uuid::new_v4().to_string(),
            query: query.to_string(),
            category,
            result_count,
            searched_at: Utc::now(),
        };
        self.store
            .with_db(|db| db.insert_search(&entry))
            .map_err(DataError::local_write)?;

        tracing::debug!(query, ?category, "search recorded");
        Ok(entry)
    }

    /// The 20 most recent searches, newest first.
    pub fn recent(&self) -> LiveQuery<SearchHistoryEntry> {
        self.recent_with_limit(RECENT_SEARCH_LIMIT)
    }

    pub fn recent_with_limit(&self, limit: u32) -> LiveQuery<SearchHistoryEntry> {
        self.store
            .live(&[Table::SearchHistory], move |db| db.recent_searches(limit))
    }

    /// Up to 10 distinct past queries containing `fragment`, ignoring case,
    /// most recently used first.  A blank fragment suggests nothing.
    ///
    /// Unlike [`recent`](Self::recent) this is a one-shot read; callers
    /// re-query as the user types.
    pub fn suggestions(&self, fragment: &str) -> Result<Vec<String>> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .with_db(|db| db.search_suggestions(fragment, SUGGESTION_LIMIT))?)
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store
            .with_db(|db| db.delete_search(id))
            .map_err(DataError::local_write)
    }

    pub fn clear_all(&self) -> Result<usize> {
        self.store
            .with_db(|db| db.delete_all_searches())
            .map_err(DataError::local_write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> SearchHistoryLedger {
        SearchHistoryLedger::new(LocalStore::open_in_memory().unwrap())
    }

    #[test]
    fn blank_query_is_rejected() {
        let ledger = ledger();
        assert!(matches!(ledger.record("   ", None, None), Err(DataError::Validation(_))));
        assert!(ledger.recent().snapshot().unwrap().is_empty());
    }

    #[test]
    fn blank_fragment_suggests_nothing() {
        let ledger = ledger();
        ledger.record("pizza", None, None).unwrap();
        ledger.record("pasta", None, None).unwrap();

        assert!(ledger.suggestions("").unwrap().is_empty());
        assert!(ledger.suggestions("  ").unwrap().is_empty());
        assert_eq!(ledger.suggestions(" PIZ ").unwrap(), vec!["pizza"]);
    }

    #[tokio::test]
    async fn recent_is_most_recent_first() {
        let ledger = ledger();
        ledger.record("pizza", Some(ItemType::Restaurant), Some(4)).unwrap();
        ledger.record("latte", Some(ItemType::Cafe), None).unwrap();
        ledger.record("  plumber ", None, Some(0)).unwrap();

        let mut recent = ledger.recent();
        let queries: Vec<String> = recent
            .next()
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|e| e.query)
            .collect();
        assert_eq!(queries, vec!["plumber", "latte", "pizza"]);
    }

    #[test]
    fn suggestions_are_distinct_and_capped() {
        let ledger = ledger();
        for i in 0..12 {
            ledger.record(&format!("pizza {i}"), None, None).unwrap();
        }
        ledger.record("Pizza 3", None, None).unwrap();
        ledger.record("pizza 3", None, None).unwrap();

        let suggestions = ledger.suggestions("PIZZA").unwrap();
        assert_eq!(suggestions.len(), 10);
        assert_eq!(suggestions[0], "pizza 3");
        assert_eq!(suggestions[1], "Pizza 3");
    }

    #[test]
    fn delete_and_clear() {
        let ledger = ledger();
        let entry = ledger.record("pizza", None, None).unwrap();
        ledger.record("sushi", None, None).unwrap();
        assert!(ledger.delete(&entry.id).unwrap());
        assert_eq!(ledger.clear_all().unwrap(), 1);
    }
}
