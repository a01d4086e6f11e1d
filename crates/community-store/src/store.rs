//! Shareable, thread-safe handle over the [`Database`].
//!
//! [`LocalStore`] is what the data layer holds.  Every call takes the
//! connection lock, runs one synchronous operation to completion and releases
//! the lock before returning, so no lock is ever held across an `.await`.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::changes::{ChangeFeed, Table};
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::listing::{Filter, Listing};
use crate::live::LiveQuery;

#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
    changes: ChangeFeed,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        let changes = db.changes().clone();
        Self {
            db: Arc::new(Mutex::new(db)),
            changes,
        }
    }

    /// Open the database at the platform default location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Database::new()?))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_db<R>(&self, f: impl FnOnce(&Database) -> Result<R>) -> Result<R> {
        let db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&db)
    }

    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    /// Build a [`LiveQuery`] that re-runs `query` whenever any of `tables`
    /// is written.
    pub fn live<T, F>(&self, tables: &[Table], query: F) -> LiveQuery<T>
    where
        T: Send + 'static,
        F: Fn(&Database) -> Result<Vec<T>> + Send + Sync + 'static,
    {
        let receivers = tables.iter().map(|t| self.changes.subscribe(*t)).collect();
        LiveQuery::new(self.clone(), receivers, Arc::new(query))
    }

    /// Typed access to one listing table.
    pub fn listings<L: Listing>(&self) -> ListingTable<L> {
        ListingTable {
            store: self.clone(),
            _listing: PhantomData,
        }
    }
}

/// The per-table contract used by the listing repositories.
pub struct ListingTable<L> {
    store: LocalStore,
    _listing: PhantomData<fn() -> L>,
}

impl<L> Clone for ListingTable<L> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _listing: PhantomData,
        }
    }
}

impl<L: Listing> ListingTable<L> {
    pub fn get_by_id(&self, id: &str) -> Result<Option<L>> {
        self.store.with_db(|db| db.get_listing(id))
    }

    /// Every row, title ascending.
    pub fn get_all(&self) -> LiveQuery<L> {
        self.store.live(&[L::table()], |db| db.list_listings())
    }

    /// Rows matching `filter`, best rated first.
    pub fn query_by_field(&self, filter: Filter) -> LiveQuery<L> {
        self.store
            .live(&[L::table()], move |db| db.query_listings_by_field(&filter))
    }

    /// Case-insensitive substring search over the title and secondary column.
    pub fn search_substring(&self, query: impl Into<String>) -> LiveQuery<L> {
        let query = query.into();
        self.store
            .live(&[L::table()], move |db| db.search_listings(&query))
    }

    /// The first `limit` rows in title order.
    pub fn first_n(&self, limit: u32) -> LiveQuery<L> {
        self.store
            .live(&[L::table()], move |db| db.list_listings_limited(limit))
    }

    pub fn upsert_one(&self, listing: &L) -> Result<()> {
        self.store.with_db(|db| db.upsert_listing(listing))
    }

    pub fn upsert_many(&self, listings: &[L]) -> Result<()> {
        self.store.with_db(|db| db.upsert_listings(listings))
    }

    /// Transactionally replace the whole table with `listings`.
    pub fn replace_all(&self, listings: &[L]) -> Result<()> {
        self.store.with_db(|db| db.replace_listings(listings))
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.with_db(|db| db.delete_listing::<L>(id))
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.store.with_db(|db| db.delete_all_listings::<L>())
    }

    pub fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.store
            .with_db(|db| db.delete_listings_older_than::<L>(cutoff))
    }

    pub fn count(&self) -> Result<u64> {
        self.store.with_db(|db| db.count_listings::<L>())
    }
}
