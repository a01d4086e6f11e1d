//! # community-data
//!
//! Offline-first data layer for the community listings client.
//!
//! Each listing domain (restaurants, cafes, rentals, jobs, services, events)
//! gets a [`ListingRepository`] that serves reads from the local
//! [`community_store`] cache and only goes to the REST API on a miss or an
//! explicit refresh.  [`AuthRepository`] owns login state through the shared
//! [`SessionState`]; the [`FavoritesLedger`] and [`SearchHistoryLedger`]
//! keep cross-domain records on the device.  [`AppData`] wires it all up.

pub mod config;
pub mod error;
pub mod ledger;
pub mod remote;
pub mod repository;
pub mod session;
pub mod state;
pub mod validation;

mod logging;

#[cfg(test)]
mod testing;

pub use community_shared::{ItemType, RemoteFailure, Resource};
pub use config::ClientConfig;
pub use error::{DataError, Result};
pub use ledger::{FavoritesLedger, SearchHistoryLedger};
pub use logging::init_tracing;
pub use remote::{AuthRemote, HttpRemote, ListingRemote};
pub use repository::{AuthRepository, CacheMaintenance, ListingRepository};
pub use session::SessionState;
pub use state::AppData;
