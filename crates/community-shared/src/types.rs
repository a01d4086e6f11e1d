use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_KM;

/// Listing category.  Also the discriminator stored in the favorites ledger
/// and the scope recorded with a search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Restaurant,
    Cafe,
    Rental,
    Job,
    Service,
    Event,
}

impl ItemType {
    pub const ALL: [ItemType; 6] = [
        Self::Restaurant,
        Self::Cafe,
        Self::Rental,
        Self::Job,
        Self::Service,
        Self::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
            Self::Rental => "rental",
            Self::Job => "job",
            Self::Service => "service",
            Self::Event => "event",
        }
    }

    /// REST collection path for this category, e.g. `restaurants`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Restaurant => "restaurants",
            Self::Cafe => "cafes",
            Self::Rental => "rentals",
            Self::Job => "jobs",
            Self::Service => "services",
            Self::Event => "events",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price bracket, carried on the wire as `$` .. `$$$$`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceRange {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Budget => "$",
            Self::Moderate => "$$",
            Self::Expensive => "$$$",
            Self::Luxury => "$$$$",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Budget => "Budget-friendly",
            Self::Moderate => "Moderate",
            Self::Expensive => "Expensive",
            Self::Luxury => "Luxury",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "$" => Some(Self::Budget),
            "$$" => Some(Self::Moderate),
            "$$$" => Some(Self::Expensive),
            "$$$$" => Some(Self::Luxury),
            _ => None,
        }
    }
}

/// Great-circle distance in kilometres between two WGS84 points.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}
