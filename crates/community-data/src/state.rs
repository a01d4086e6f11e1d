//! Everything a front end needs, wired once at startup.

use std::sync::Arc;

use community_store::{Cafe, Event, Job, LocalStore, Rental, Restaurant, Service};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::ledger::{FavoritesLedger, SearchHistoryLedger};
use crate::remote::{AuthRemote, HttpRemote, ListingRemote};
use crate::repository::{
    AuthRepository, CacheMaintenance, CafeRepository, EventRepository, JobRepository,
    ListingRepository, RentalRepository, RestaurantRepository, ServiceRepository,
};
use crate::session::SessionState;

/// Central data-layer state.
///
/// Cheap to clone: every member is a handle onto the same store, session
/// and HTTP client.
#[derive(Clone)]
pub struct AppData {
    pub config: ClientConfig,
    pub store: LocalStore,
    pub session: SessionState,

    pub auth: AuthRepository,
    pub restaurants: RestaurantRepository,
    pub cafes: CafeRepository,
    pub rentals: RentalRepository,
    pub jobs: JobRepository,
    pub services: ServiceRepository,
    pub events: EventRepository,

    pub favorites: FavoritesLedger,
    pub search_history: SearchHistoryLedger,
}

impl AppData {
    /// Open the configured database (or the platform default) and connect
    /// every repository to the REST API.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let store = match &config.db_path {
            Some(path) => LocalStore::open_at(path)?,
            None => LocalStore::open_default()?,
        };
        Self::with_store(config, store)
    }

    pub fn with_store(config: ClientConfig, store: LocalStore) -> Result<Self> {
        let session = SessionState::load(store.clone())?;
        let http = Arc::new(HttpRemote::new(&config, session.clone())?);
        Ok(Self::with_remote(config, store, session, http))
    }

    /// Wire everything against a single remote implementing every endpoint.
    pub fn with_remote<R>(
        config: ClientConfig,
        store: LocalStore,
        session: SessionState,
        remote: Arc<R>,
    ) -> Self
    where
        R: AuthRemote
            + ListingRemote<Restaurant>
            + ListingRemote<Cafe>
            + ListingRemote<Rental>
            + ListingRemote<Job>
            + ListingRemote<Service>
            + ListingRemote<Event>
            + 'static,
    {
        let auth = AuthRepository::new(remote.clone(), store.clone(), session.clone());

        Self {
            auth,
            restaurants: ListingRepository::<Restaurant>::new(
                remote.clone(),
                store.clone(),
                session.clone(),
                &config,
            ),
            cafes: ListingRepository::<Cafe>::new(
                remote.clone(),
                store.clone(),
                session.clone(),
                &config,
            ),
            rentals: ListingRepository::<Rental>::new(
                remote.clone(),
                store.clone(),
                session.clone(),
                &config,
            ),
            jobs: ListingRepository::<Job>::new(
                remote.clone(),
                store.clone(),
                session.clone(),
                &config,
            ),
            services: ListingRepository::<Service>::new(
                remote.clone(),
                store.clone(),
                session.clone(),
                &config,
            ),
            events: ListingRepository::<Event>::new(
                remote,
                store.clone(),
                session.clone(),
                &config,
            ),
            favorites: FavoritesLedger::new(store.clone()),
            search_history: SearchHistoryLedger::new(store.clone()),
            config,
            store,
            session,
        }
    }

    /// One maintenance handle per listing domain.
    pub fn maintenance(&self) -> Vec<Arc<dyn CacheMaintenance>> {
        let handles: [Arc<dyn CacheMaintenance>; 6] = [
            Arc::new(self.restaurants.clone()),
            Arc::new(self.cafes.clone()),
            Arc::new(self.rentals.clone()),
            Arc::new(self.jobs.clone()),
            Arc::new(self.services.clone()),
            Arc::new(self.events.clone()),
        ];
        handles.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use community_shared::ItemType;

    use super::*;

    #[test]
    fn open_wires_every_domain() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            db_path: Some(dir.path().join("community.db")),
            ..ClientConfig::default()
        };

        let data = AppData::open(config).unwrap();
        assert!(!data.auth.is_logged_in());

        let domains: Vec<ItemType> = data.maintenance().iter().map(|m| m.item_type()).collect();
        assert_eq!(domains, ItemType::ALL.to_vec());
    }
}
