//! The per-domain shape every cached listing table shares.
//!
//! Each listing table stores the full entity as a JSON payload next to a few
//! derived columns used for ordering, filtering and substring search.  The
//! [`Listing`] impls below decide which entity field feeds which column.

use chrono::{DateTime, Utc};
use community_shared::ItemType;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::changes::Table;
use crate::models::{Cafe, Event, Job, Rental, Restaurant, Service};

/// Secondary filter for `query_by_field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches the domain's city-like column.
    City(String),
    /// Matches the domain's category-like column (cuisine, job type, ...).
    Category(String),
}

impl Filter {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::City(_) => "city",
            Self::Category(_) => "category",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::City(v) | Self::Category(v) => v,
        }
    }

    /// Query-string key understood by the REST API for this filter.
    pub fn api_key(&self, item_type: ItemType) -> &'static str {
        match (self, item_type) {
            (Self::City(_), ItemType::Job | ItemType::Service) => "location",
            (Self::City(_), ItemType::Event) => "venue",
            (Self::City(_), _) => "city",
            (Self::Category(_), ItemType::Restaurant) => "cuisine",
            (Self::Category(_), ItemType::Job) => "job_type",
            (Self::Category(_), _) => "category",
        }
    }
}

pub trait Listing: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const ITEM_TYPE: ItemType;

    fn id(&self) -> &str;
    /// Name or title; primary sort key and search column.
    fn title(&self) -> &str;
    fn description(&self) -> Option<&str>;
    /// Secondary substring-search column.
    fn search_field(&self) -> Option<&str>;
    fn city(&self) -> Option<&str>;

    fn category(&self) -> Option<&str> {
        None
    }

    fn rating(&self) -> Option<f64> {
        None
    }

    fn primary_image(&self) -> Option<&str> {
        None
    }

    /// `(latitude, longitude)` when known.
    fn coordinates(&self) -> Option<(f64, f64)> {
        None
    }

    fn cached_at(&self) -> DateTime<Utc>;
    fn set_cached_at(&mut self, at: DateTime<Utc>);

    fn table() -> Table {
        Table::for_item(Self::ITEM_TYPE)
    }
}

fn first(images: &Option<Vec<String>>) -> Option<&str> {
    images.as_ref()?.first().map(String::as_str)
}

impl Listing for Restaurant {
    const ITEM_TYPE: ItemType = ItemType::Restaurant;

    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.name
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn search_field(&self) -> Option<&str> {
        self.cuisine.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }
    fn category(&self) -> Option<&str> {
        self.cuisine.as_deref()
    }
    fn rating(&self) -> Option<f64> {
        self.rating
    }
    fn primary_image(&self) -> Option<&str> {
        first(&self.images)
    }
    fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
    fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }
    fn set_cached_at(&mut self, at: DateTime<Utc>) {
        self.cached_at = at;
    }
}

impl Listing for Cafe {
    const ITEM_TYPE: ItemType = ItemType::Cafe;

    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.name
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn search_field(&self) -> Option<&str> {
        self.city.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }
    fn rating(&self) -> Option<f64> {
        self.rating
    }
    fn primary_image(&self) -> Option<&str> {
        first(&self.images)
    }
    fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }
    fn set_cached_at(&mut self, at: DateTime<Utc>) {
        self.cached_at = at;
    }
}

impl Listing for Rental {
    const ITEM_TYPE: ItemType = ItemType::Rental;

    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn search_field(&self) -> Option<&str> {
        self.city.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }
    fn primary_image(&self) -> Option<&str> {
        first(&self.images)
    }
    fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }
    fn set_cached_at(&mut self, at: DateTime<Utc>) {
        self.cached_at = at;
    }
}

impl Listing for Job {
    const ITEM_TYPE: ItemType = ItemType::Job;

    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn search_field(&self) -> Option<&str> {
        self.company.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.location.as_deref()
    }
    fn category(&self) -> Option<&str> {
        self.job_type.as_deref()
    }
    fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }
    fn set_cached_at(&mut self, at: DateTime<Utc>) {
        self.cached_at = at;
    }
}

impl Listing for Service {
    const ITEM_TYPE: ItemType = ItemType::Service;

    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn search_field(&self) -> Option<&str> {
        self.category.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.location.as_deref()
    }
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
    fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }
    fn set_cached_at(&mut self, at: DateTime<Utc>) {
        self.cached_at = at;
    }
}

impl Listing for Event {
    const ITEM_TYPE: ItemType = ItemType::Event;

    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn search_field(&self) -> Option<&str> {
        self.venue.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.venue.as_deref()
    }
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
    fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }
    fn set_cached_at(&mut self, at: DateTime<Utc>) {
        self.cached_at = at;
    }
}
