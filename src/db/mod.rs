//! Database layer (Firestore).

pub mod firestore;

pub use firestore::WeatherDb;

/// Collection names as constants.
pub mod collections {
    /// Search history (one document per successful lookup)
    pub const HISTORY: &str = "history";
    /// Favorite cities
    pub const FAVORITES: &str = "favorites";
}
