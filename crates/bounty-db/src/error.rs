use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Unique/primary-key violation. Never retried.
    #[error("record already exists: {0}")]
    Duplicate(String),

    /// An update or foreign key referenced a row that does not exist.
    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
