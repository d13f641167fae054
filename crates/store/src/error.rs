use common::Version;
use thiserror::Error;

/// Errors that can occur when interacting with the aggregate stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A concurrent writer changed the aggregate since it was loaded.
    #[error("concurrency conflict for {entity} {id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        entity: &'static str,
        id: String,
        expected: Version,
        actual: Version,
    },

    /// An aggregate with this ID already exists.
    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: &'static str, id: String },

    /// The aggregate to update does not exist.
    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: String },

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
