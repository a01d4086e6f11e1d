use community_shared::ItemType;
use community_store::{Favorite, LiveQuery, LocalStore, Table};

use crate::error::{DataError, Result};

/// Per-user favorites across every listing domain.
#[derive(Clone)]
pub struct FavoritesLedger {
    store: LocalStore,
}

impl FavoritesLedger {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn is_favorite(&self, user_id: &str, item_id: &str, item_type: ItemType) -> Result<bool> {
        Ok(self
            .store
            .with_db(|db| db.is_favorite(user_id, item_id, item_type))?)
    }

    /// The user's favorites of one domain, newest first.
    pub fn list_by_type(&self, user_id: &str, item_type: ItemType) -> LiveQuery<Favorite> {
        let user_id = user_id.to_string();
        self.store.live(&[Table::Favorites], move |db| {
            db.list_favorites_by_type(&user_id, item_type)
        })
    }

    /// Every favorite of the user, newest first.
    pub fn list_all(&self, user_id: &str) -> LiveQuery<Favorite> {
        let user_id = user_id.to_string();
        self.store
            .live(&[Table::Favorites], move |db| db.list_favorites(&user_id))
    }

    /// Add or refresh a favorite; unique per user, item and type.
    pub fn upsert(&self, favorite: &Favorite) -> Result<()> {
        self.store
            .with_db(|db| db.upsert_favorite(favorite))
            .map_err(DataError::local_write)?;
        tracing::debug!(
            user_id = %favorite.user_id,
            item_id = %favorite.item_id,
            item_type = %favorite.item_type,
            "favorite stored"
        );
        Ok(())
    }

    pub fn remove(&self, user_id: &str, item_id: &str, item_type: ItemType) -> Result<bool> {
        self.store
            .with_db(|db| db.delete_favorite(user_id, item_id, item_type))
            .map_err(DataError::local_write)
    }

    pub fn clear_for_user(&self, user_id: &str) -> Result<usize> {
        let removed = self
            .store
            .with_db(|db| db.delete_favorites_for_user(user_id))
            .map_err(DataError::local_write)?;
        tracing::debug!(user_id, removed, "favorites cleared");
        Ok(removed)
    }

    pub fn count(&self, user_id: &str) -> Result<u64> {
        Ok(self.store.with_db(|db| db.count_favorites(user_id))?)
    }
}

#[cfg(test)]
mod tests {
    use community_store::{Cafe, Restaurant};

    use super::*;

    fn restaurant(id: &str) -> Restaurant {
        serde_json::from_value(serde_json::json!({"id": id, "name": format!("R{id}")})).unwrap()
    }

    fn ledger() -> FavoritesLedger {
        FavoritesLedger::new(LocalStore::open_in_memory().unwrap())
    }

    #[test]
    fn upsert_twice_keeps_one_row() {
        let ledger = ledger();
        ledger.upsert(&Favorite::snapshot("u1", &restaurant("1"))).unwrap();
        ledger.upsert(&Favorite::snapshot("u1", &restaurant("1"))).unwrap();
        assert_eq!(ledger.count("u1").unwrap(), 1);
    }

    #[test]
    fn remove_and_clear() {
        let ledger = ledger();
        ledger.upsert(&Favorite::snapshot("u1", &restaurant("1"))).unwrap();
        ledger.upsert(&Favorite::snapshot("u1", &restaurant("2"))).unwrap();
        ledger.upsert(&Favorite::snapshot("u2", &restaurant("1"))).unwrap();

        assert!(ledger.remove("u1", "1", ItemType::Restaurant).unwrap());
        assert!(!ledger.is_favorite("u1", "1", ItemType::Restaurant).unwrap());
        assert!(ledger.is_favorite("u2", "1", ItemType::Restaurant).unwrap());

        assert_eq!(ledger.clear_for_user("u1").unwrap(), 1);
        assert_eq!(ledger.count("u2").unwrap(), 1);
    }

    #[tokio::test]
    async fn live_lists_follow_writes() {
        let ledger = ledger();
        let mut restaurants = ledger.list_by_type("u1", ItemType::Restaurant);
        let mut all = ledger.list_all("u1");
        assert!(restaurants.next().await.unwrap().unwrap().is_empty());
        assert!(all.next().await.unwrap().unwrap().is_empty());

        let cafe: Cafe =
            serde_json::from_value(serde_json::json!({"id": "c1", "name": "Beans"})).unwrap();
        ledger.upsert(&Favorite::snapshot("u1", &cafe)).unwrap();

        assert!(restaurants.next().await.unwrap().unwrap().is_empty());
        assert_eq!(all.next().await.unwrap().unwrap()[0].item_title, "Beans");
    }
}
