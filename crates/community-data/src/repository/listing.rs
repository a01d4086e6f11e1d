//! Cache-then-network repository shared by the six listing domains.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use community_shared::types::distance_km;
use community_shared::ItemType;
use community_store::{
    Cafe, Event, Favorite, Filter, Job, Listing, ListingTable, LiveQuery, LocalStore, Rental,
    Restaurant, Service, Table,
};

use crate::config::ClientConfig;
use crate::error::{DataError, Result};
use crate::ledger::FavoritesLedger;
use crate::remote::{ListingRemote, PageRequest};
use crate::session::SessionState;

use super::CacheMaintenance;

pub type RestaurantRepository = ListingRepository<Restaurant>;
pub type CafeRepository = ListingRepository<Cafe>;
pub type RentalRepository = ListingRepository<Rental>;
pub type JobRepository = ListingRepository<Job>;
pub type ServiceRepository = ListingRepository<Service>;
pub type EventRepository = ListingRepository<Event>;

/// Reads are served from the local table; the network is consulted only on
/// a miss or on explicit refresh.  A cached row, however old, always wins
/// over a network round trip.
pub struct ListingRepository<L: Listing> {
    remote: Arc<dyn ListingRemote<L>>,
    store: LocalStore,
    table: ListingTable<L>,
    favorites: FavoritesLedger,
    session: SessionState,
    page_size: u32,
    featured_limit: u32,
}

impl<L: Listing> Clone for ListingRepository<L> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            store: self.store.clone(),
            table: self.table.clone(),
            favorites: self.favorites.clone(),
            session: self.session.clone(),
            page_size: self.page_size,
            featured_limit: self.featured_limit,
        }
    }
}

impl<L: Listing> ListingRepository<L> {
    pub fn new(
        remote: Arc<dyn ListingRemote<L>>,
        store: LocalStore,
        session: SessionState,
        config: &ClientConfig,
    ) -> Self {
        Self {
            remote,
            table: store.listings::<L>(),
            favorites: FavoritesLedger::new(store.clone()),
            store,
            session,
            page_size: config.page_size,
            featured_limit: config.featured_limit,
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Cached entity if present, otherwise fetched and written through.
    pub async fn get_by_id(&self, id: &str) -> Result<L> {
        if let Some(cached) = self.table.get_by_id(id)? {
            tracing::debug!(item_type = %L::ITEM_TYPE, id, "cache hit");
            return Ok(cached);
        }

        let fetched = self.remote.get_by_id(id).await?;
        tracing::debug!(item_type = %L::ITEM_TYPE, id, "fetched from remote");
        self.cache_quietly(std::slice::from_ref(&fetched));
        Ok(fetched)
    }

    /// Every cached entity, title ascending.
    pub fn list(&self) -> LiveQuery<L> {
        self.table.get_all()
    }

    /// Cached entities matching `filter`, best rated first.
    pub fn list_by_filter(&self, filter: Filter) -> LiveQuery<L> {
        self.table.query_by_field(filter)
    }

    /// Case-insensitive substring search over the cached table.
    pub fn search(&self, query: &str) -> LiveQuery<L> {
        self.table.search_substring(query.trim())
    }

    /// Search the API, caching whatever comes back.
    pub async fn search_remote(&self, query: &str, filter: Option<&Filter>) -> Result<Vec<L>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DataError::Validation(vec!["Search query is required".to_string()]));
        }

        let mut request = PageRequest::first(self.page_size);
        if let Some(filter) = filter {
            request = request.with_filter(filter.api_key(L::ITEM_TYPE), filter.value());
        }

        let page = self.remote.search(query, &request).await?;
        tracing::debug!(
            item_type = %L::ITEM_TYPE,
            query,
            results = page.data.len(),
            "remote search"
        );
        self.cache_quietly(&page.data);
        Ok(page.data)
    }

    /// Featured items from the dedicated endpoint, written through.  When the
    /// endpoint fails the first cached rows stand in; the failure surfaces
    /// only if there is nothing cached to fall back on.
    pub async fn get_featured(&self) -> Result<Vec<L>> {
        match self.remote.featured(self.featured_limit).await {
            Ok(items) => {
                self.cache_quietly(&items);
                Ok(items)
            }
            Err(failure) => {
                let fallback = self
                    .store
                    .with_db(|db| db.list_listings_limited::<L>(self.featured_limit))?;
                if fallback.is_empty() {
                    return Err(failure.into());
                }
                tracing::debug!(
                    item_type = %L::ITEM_TYPE,
                    code = failure.code,
                    "featured endpoint failed, serving cached slice"
                );
                Ok(fallback)
            }
        }
    }

    /// The cached slice used as the featured fallback, kept live.
    pub fn featured_live(&self) -> LiveQuery<L> {
        self.table.first_n(self.featured_limit)
    }

    /// Cached entities within `radius_km` of a point, nearest first.
    /// Entities without coordinates never match.
    pub fn nearby(&self, latitude: f64, longitude: f64, radius_km: f64) -> Result<Vec<L>> {
        let all = self.store.with_db(|db| db.list_listings::<L>())?;

        let mut within: Vec<(f64, L)> = all
            .into_iter()
            .filter_map(|listing| {
                let (lat, lng) = listing.coordinates()?;
                let distance = distance_km(latitude, longitude, lat, lng);
                (distance <= radius_km).then_some((distance, listing))
            })
            .collect();
        within.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        Ok(within.into_iter().map(|(_, listing)| listing).collect())
    }

    // ------------------------------------------------------------------
    // Refresh and eviction
    // ------------------------------------------------------------------

    /// Replace the cached table with the first remote page.  On remote
    /// failure the table is untouched.
    pub async fn refresh(&self) -> Result<usize> {
        let page = self
            .remote
            .list(&PageRequest::first(self.page_size))
            .await?;

        let count = page.data.len();
        self.table
            .replace_all(&page.data)
            .map_err(DataError::local_write)?;

        tracing::info!(item_type = %L::ITEM_TYPE, count, "cache refreshed");
        Ok(count)
    }

    pub fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let removed = self
            .table
            .delete_older_than(cutoff)
            .map_err(DataError::local_write)?;
        if removed > 0 {
            tracing::info!(item_type = %L::ITEM_TYPE, removed, %cutoff, "evicted stale rows");
        }
        Ok(removed)
    }

    pub fn clear_cache(&self) -> Result<usize> {
        self.table.delete_all().map_err(DataError::local_write)
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Favorite on the server, then mirror into the local ledger using the
    /// cached entity as snapshot.
    pub async fn add_to_favorites(&self, item_id: &str) -> Result<()> {
        let user_id = self.session.current_user_id().ok_or(DataError::NotLoggedIn)?;

        self.remote.favorite(item_id).await?;

        match self.table.get_by_id(item_id) {
            Ok(Some(listing)) => {
                if let Err(e) = self.favorites.upsert(&Favorite::snapshot(&user_id, &listing)) {
                    tracing::warn!(error = %e, item_id, "failed to mirror favorite locally");
                }
            }
            Ok(None) => {
                tracing::warn!(
                    item_type = %L::ITEM_TYPE,
                    item_id,
                    "favorited item is not cached, local ledger not updated"
                );
            }
            Err(e) => tracing::warn!(error = %e, item_id, "failed to read favorited item"),
        }
        Ok(())
    }

    pub async fn remove_from_favorites(&self, item_id: &str) -> Result<()> {
        let user_id = self.session.current_user_id().ok_or(DataError::NotLoggedIn)?;

        self.remote.unfavorite(item_id).await?;

        if let Err(e) = self.favorites.remove(&user_id, item_id, L::ITEM_TYPE) {
            tracing::warn!(error = %e, item_id, "failed to remove local favorite");
        }
        Ok(())
    }

    /// Whether the session user has favorited `item_id`.  `false` when
    /// logged out.
    pub fn is_favorite(&self, item_id: &str) -> Result<bool> {
        match self.session.current_user_id() {
            Some(user_id) => self.favorites.is_favorite(&user_id, item_id, L::ITEM_TYPE),
            None => Ok(false),
        }
    }

    /// The session user's favorites of this domain, resolved against the
    /// cached entities, newest favorite first.  Favorites whose entity is no
    /// longer cached are left out.
    pub fn favorites(&self) -> LiveQuery<L> {
        let session = self.session.clone();
        self.store
            .live(&[Table::Favorites, Table::Session, L::table()], move |db| {
                let Some(user_id) = session.current_user_id() else {
                    return Ok(Vec::new());
                };
                let mut listings = Vec::new();
                for favorite in db.list_favorites_by_type(&user_id, L::ITEM_TYPE)? {
                    if let Some(listing) = db.get_listing::<L>(&favorite.item_id)? {
                        listings.push(listing);
                    }
                }
                Ok(listings)
            })
    }

    /// Write fetched entities through to the cache.  A failure here does not
    /// fail the fetch that produced them.
    fn cache_quietly(&self, items: &[L]) {
        if items.is_empty() {
            return;
        }
        if let Err(e) = self.table.upsert_many(items) {
            tracing::warn!(
                item_type = %L::ITEM_TYPE,
                error = %e,
                count = items.len(),
                "failed to cache fetched items"
            );
        }
    }
}

#[async_trait]
impl<L: Listing> CacheMaintenance for ListingRepository<L> {
    fn item_type(&self) -> ItemType {
        L::ITEM_TYPE
    }

    async fn refresh(&self) -> Result<usize> {
        ListingRepository::refresh(self).await
    }

    fn evict_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.delete_older_than(cutoff)
    }
}
