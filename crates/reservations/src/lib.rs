//! Reservation engine coordinators.
//!
//! Each operation runs inside one atomic scope of the inventory store:
//! 1. Read the records it depends on
//! 2. Check them (validator, ownership, booking status)
//! 3. Stage the inventory write and the ledger write
//! 4. Commit both, or neither
//!
//! Concurrent writers to the same inventory serialize through the store's
//! commit-time version check. The loser gets `ReservationError::Contention`,
//! which callers may retry verbatim.

pub mod admin;
pub mod cancel;
pub mod ledger;
mod outcome;
pub mod reserve;

pub use admin::InventoryAdmin;
pub use cancel::CancellationCoordinator;
pub use ledger::{BookingLedger, BookingSummary};
pub use reserve::ReservationCoordinator;
