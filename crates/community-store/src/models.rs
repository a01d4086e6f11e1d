//! Domain model structs cached in the local SQLite database.
//!
//! Listing and user structs deserialize straight from the REST payloads
//! (snake_case field names).  `cached_at` never travels on the wire or in
//! the stored JSON payload: it defaults to the fetch time and is overwritten
//! from the row's `cached_at` column when read back from the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use community_shared::types::distance_km;
use community_shared::{ItemType, PriceRange};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Restaurant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub hours: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(skip, default = "Utc::now")]
    pub cached_at: DateTime<Utc>,
}

impl Restaurant {
    pub fn primary_image_url(&self) -> Option<&str> {
        self.images.as_ref()?.first().map(String::as_str)
    }

    /// `address, city, province postal_code`, skipping missing parts.
    pub fn formatted_address(&self) -> String {
        let mut out = String::new();
        for part in [&self.address, &self.city, &self.province].into_iter().flatten() {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(part);
        }
        if let Some(postal) = &self.postal_code {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(postal);
        }
        out
    }

    pub fn distance_from(&self, lat: f64, lng: f64) -> Option<f64> {
        Some(distance_km(lat, lng, self.latitude?, self.longitude?))
    }
}

// ---------------------------------------------------------------------------
// Cafe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cafe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(skip, default = "Utc::now")]
    pub cached_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Rental
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rental {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub rent: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(skip, default = "Utc::now")]
    pub cached_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(skip, default = "Utc::now")]
    pub cached_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(skip, default = "Utc::now")]
    pub cached_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(skip, default = "Utc::now")]
    pub cached_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// An account as returned by `auth/user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_phone_verified: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(skip, default = "Utc::now")]
    pub cached_at: DateTime<Utc>,
}

impl User {
    /// Name if set, otherwise the local part of the email.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ if !self.email.trim().is_empty() => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
            _ => "User".to_string(),
        }
    }

    /// Up to two upper-case initials for an avatar placeholder.
    pub fn initials(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name
                .split_whitespace()
                .filter_map(|w| w.chars().next())
                .flat_map(char::to_uppercase)
                .take(2)
                .collect(),
            _ => self
                .email
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_else(|| "U".to_string()),
        }
    }

    pub fn is_profile_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.name) && filled(&self.phone) && filled(&self.location)
    }
}

// ---------------------------------------------------------------------------
// Favorite
// ---------------------------------------------------------------------------

/// One favorited item.  Unique per `(user_id, item_id, item_type)`; the
/// title/description/image are a snapshot taken when the item was favorited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub item_type: ItemType,
    pub item_title: String,
    pub item_description: Option<String>,
    pub item_image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Search history
// ---------------------------------------------------------------------------

/// A past query.  `category` is `None` for a global search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    pub category: Option<ItemType>,
    pub result_count: Option<u32>,
    pub searched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Persisted login state.  Stored as a single JSON row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    pub auth_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
    pub expires_in: Option<i64>,
}
