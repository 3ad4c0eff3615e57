use domain::{ReservationError, Resource};
use thiserror::Error;

use crate::Version;

/// Errors that can occur when interacting with the reservation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record changed between the read and the commit.
    #[error(
        "Version conflict for {resource} {id}: expected version {expected}, found {actual}"
    )]
    Conflict {
        resource: Resource,
        id: String,
        expected: Version,
        actual: Version,
    },

    /// The store could not be reached or refused the commit.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A persisted row violates the domain invariants.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

impl From<StoreError> for ReservationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { resource, id, .. } => {
                ReservationError::Contention { resource, id }
            }
            other => ReservationError::StoreFailure(other.to_string()),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ErrorKind;

    #[test]
    fn conflict_maps_to_contention() {
        let err = StoreError::Conflict {
            resource: Resource::Event,
            id: "e-1".to_string(),
            expected: Version::first(),
            actual: Version::new(2),
        };
        assert!(err.is_conflict());
        assert_eq!(ReservationError::from(err).kind(), ErrorKind::Contention);
    }

    #[test]
    fn other_errors_map_to_store_failure() {
        let err = StoreError::Unavailable("connection reset".to_string());
        let mapped = ReservationError::from(err);
        assert_eq!(mapped.kind(), ErrorKind::StoreFailure);
        assert!(mapped.to_string().contains("connection reset"));
    }
}
