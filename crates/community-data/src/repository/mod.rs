//! Domain repositories: cache-then-network access per listing domain, plus
//! the account repository.

pub mod auth;
pub mod listing;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use community_shared::ItemType;

pub use auth::AuthRepository;
pub use listing::{
    CafeRepository, EventRepository, JobRepository, ListingRepository, RentalRepository,
    RestaurantRepository, ServiceRepository,
};

use crate::error::Result;

/// Type-erased maintenance hooks so a sweep can walk every domain.
#[async_trait]
pub trait CacheMaintenance: Send + Sync {
    fn item_type(&self) -> ItemType;

    /// Replace the cached table with the first remote page.  Returns the
    /// number of rows now cached.
    async fn refresh(&self) -> Result<usize>;

    /// Evict rows cached before `cutoff`.  Returns the number removed.
    fn evict_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
