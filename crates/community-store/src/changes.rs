//! Per-table change notifications.
//!
//! Every write bumps a version counter on its table's `watch` channel.
//! Live queries hold receivers and re-run when the version moves; a slow
//! receiver skips intermediate versions and only sees the latest one.

use std::sync::Arc;

use community_shared::ItemType;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Restaurants,
    Cafes,
    Rentals,
    Jobs,
    Services,
    Events,
    Users,
    Favorites,
    SearchHistory,
    Session,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Self::Restaurants,
        Self::Cafes,
        Self::Rentals,
        Self::Jobs,
        Self::Services,
        Self::Events,
        Self::Users,
        Self::Favorites,
        Self::SearchHistory,
        Self::Session,
    ];

    pub const LISTINGS: [Table; 6] = [
        Self::Restaurants,
        Self::Cafes,
        Self::Rentals,
        Self::Jobs,
        Self::Services,
        Self::Events,
    ];

    pub fn for_item(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Restaurant => Self::Restaurants,
            ItemType::Cafe => Self::Cafes,
            ItemType::Rental => Self::Rentals,
            ItemType::Job => Self::Jobs,
            ItemType::Service => Self::Services,
            ItemType::Event => Self::Events,
        }
    }

    /// SQL table name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Restaurants => "cached_restaurants",
            Self::Cafes => "cached_cafes",
            Self::Rentals => "cached_rentals",
            Self::Jobs => "cached_jobs",
            Self::Services => "cached_services",
            Self::Events => "cached_events",
            Self::Users => "cached_users",
            Self::Favorites => "user_favorites",
            Self::SearchHistory => "search_history",
            Self::Session => "session",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Cloneable handle to the per-table version channels.
#[derive(Clone)]
pub struct ChangeFeed {
    senders: Arc<[watch::Sender<u64>; 10]>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self {
            senders: Arc::new(std::array::from_fn(|_| watch::channel(0).0)),
        }
    }

    /// Receiver positioned at the current version (nothing pending).
    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.senders[table.index()].subscribe()
    }

    pub fn notify(&self, table: Table) {
        self.senders[table.index()].send_modify(|v| *v = v.wrapping_add(1));
        tracing::trace!(table = table.name(), "table changed");
    }

    pub fn version(&self, table: Table) -> u64 {
        *self.senders[table.index()].borrow()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
