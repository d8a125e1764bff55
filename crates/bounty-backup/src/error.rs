use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup store unavailable: {0}")]
    Unavailable(String),

    /// The batch committed but did not answer every queued command.
    #[error("batch returned {0} replies, expected 2")]
    MissingReply(usize),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
