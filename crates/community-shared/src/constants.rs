/// Default REST API root
pub const DEFAULT_API_URL: &str = "https://api.community.app/v1/";

/// HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Database file name inside the platform data directory
pub const DATABASE_FILE: &str = "community.db";

/// Pagination
pub const INITIAL_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Number of rows served by the cached "featured" slice
pub const FEATURED_LIMIT: u32 = 5;

/// Search history window returned by `recent()`
pub const RECENT_SEARCH_LIMIT: u32 = 20;

/// Maximum number of search suggestions
pub const SUGGESTION_LIMIT: u32 = 10;

/// Rows older than this are evicted by the refresh sweep
pub const CACHE_MAX_AGE_HOURS: i64 = 24;

/// Mean Earth radius used by the haversine distance
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Minimum password length accepted before any request is sent
pub const MIN_PASSWORD_LEN: usize = 6;
