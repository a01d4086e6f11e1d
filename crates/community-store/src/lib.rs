//! # community-store
//!
//! Local SQLite cache for the community listings client.
//!
//! One table per listing domain plus the cached user table, the favorites
//! and search-history ledgers, and the persisted session row.  The
//! synchronous [`Database`] exposes typed CRUD helpers; [`LocalStore`] wraps
//! it for sharing across tasks and hands out [`LiveQuery`] subscriptions fed
//! by the per-table [`ChangeFeed`].

pub mod changes;
pub mod database;
pub mod favorites;
pub mod listing;
pub mod listings;
pub mod live;
pub mod migrations;
pub mod models;
pub mod search_history;
pub mod session;
pub mod store;
pub mod users;

mod codec;
mod error;

pub use changes::{ChangeFeed, Table};
pub use database::Database;
pub use error::{Result, StoreError};
pub use listing::{Filter, Listing};
pub use live::LiveQuery;
pub use models::*;
pub use store::{ListingTable, LocalStore};
