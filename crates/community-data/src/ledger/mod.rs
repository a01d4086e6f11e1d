//! Cross-domain records kept only on this device.

pub mod favorites;
pub mod search_history;

pub use favorites::FavoritesLedger;
pub use search_history::SearchHistoryLedger;
