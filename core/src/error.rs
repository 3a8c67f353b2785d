use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot version {found} is not supported")]
    SnapshotVersion { found: u32 },

    #[error("Invalid match ranking: {reason}")]
    InvalidRanks { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type TimerResult<T> = Result<T, TimerError>;
