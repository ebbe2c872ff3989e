use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Catalog is closed")]
    Closed,

    #[error("Catalog connection lock poisoned")]
    LockPoisoned,

    #[error("Catalog task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Photo not found: {0}")]
    PhotoNotFound(i64),
}
