use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No platform data directory to put the default database in.
    #[error("Could not determine application data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A cached payload failed to encode or decode.
    #[error("Corrupt cached payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found")]
    NotFound,

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A thread panicked while holding the connection.
    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
