//! Versioned storage for event inventories and the booking ledger.
//!
//! Every change goes through an atomic [`Scope`]: reads record the version
//! they saw, writes are staged, and the commit applies all of them or none.

pub mod change;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod scope;
pub mod store;
pub mod version;

pub use change::{ChangeSet, Removal, Write};
pub use error::{Result, StoreError};
pub use memory::InMemoryReservationStore;
pub use postgres::PostgresReservationStore;
pub use query::BookingQuery;
pub use scope::Scope;
pub use store::{ReservationStore, ReservationStoreExt};
pub use version::{Version, Versioned};
